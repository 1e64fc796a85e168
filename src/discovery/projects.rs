//! Project, corpus and user discovery
//!
//! Projects are listed by the `admin` collection. Each project declares a
//! collection prefix and the collections it owns (`dbCollections`); a
//! collection is only published if it both exists and is declared.

use serde_json::Value;

use crate::observability::Logger;
use crate::publication::is_document_public;
use crate::store::{Collection, Document, Server, StoreResult, ViewOptions};
use crate::view::{apply_view, ReaderConfig, ViewItem, ViewResult};

use super::collections::{CollectionCategory, PublicCollections};

/// Collection holding projects, users and user groups
pub const ADMIN_COLLECTION: &str = "admin";

pub const ACTIVE_PROJECTS_VIEW: &str = "admin/all_active_projects";
pub const ACTIVE_CORPORA_VIEW: &str = "corpus/all_active_btstextcorpus";
pub const ACTIVE_USERS_VIEW: &str = "admin/all_active_btsusers";
pub const ACTIVE_USERGROUPS_VIEW: &str = "admin/all_active_btsusergroups";

/// Values of the active-projects view
pub fn get_projects<S: Server>(server: &S) -> StoreResult<Vec<Value>> {
    let admin = server.collection(ADMIN_COLLECTION)?;
    let projects = admin.view(ACTIVE_PROJECTS_VIEW, &ViewOptions::all())?;
    Ok(projects.rows.into_iter().map(|row| row.value).collect())
}

/// Collection names a project declares in `dbCollections`
fn declared_collections(project: &Document) -> Vec<String> {
    project
        .get("dbCollections")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("collectionName").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Open `name` if the server has it; failures are logged and skipped
fn open_if_present<S: Server>(server: &S, name: &str) -> Option<S::Collection> {
    if !server.contains(name) {
        return None;
    }
    match server.collection(name) {
        Ok(collection) => Some(collection),
        Err(e) => {
            Logger::info("COLLECTION_SKIPPED", &[("collection", name), ("reason", e.message())]);
            None
        }
    }
}

/// Collections of the public corpora of project `prefix`
///
/// Reads the corpus index in `<prefix>_corpus`; a project without one has no
/// public corpora. Corpora whose collection is missing or cannot be opened
/// are skipped.
pub fn public_corpora_of_project<S: Server>(
    server: &S,
    prefix: &str,
) -> StoreResult<Vec<S::Collection>> {
    let index_name = format!("{}_corpus", prefix);
    if !server.contains(&index_name) {
        return Ok(Vec::new());
    }

    let corpora = server
        .collection(&index_name)?
        .view(ACTIVE_CORPORA_VIEW, &ViewOptions::all())?;

    let mut public = Vec::new();
    for row in corpora.rows {
        let Some(corpus) = Document::from_value(row.value) else {
            continue;
        };
        if !is_document_public(&corpus) {
            continue;
        }
        let Some(corpus_prefix) = corpus.get_str("corpusPrefix") else {
            continue;
        };
        let name = format!("{}_corpus_{}", prefix, corpus_prefix);
        public.extend(open_if_present(server, &name));
    }
    Ok(public)
}

/// Every published collection of every active project, grouped by category
pub fn all_public_collections<S: Server>(
    server: &S,
) -> StoreResult<PublicCollections<S::Collection>> {
    let mut found = PublicCollections::new();
    let projects = server
        .collection(ADMIN_COLLECTION)?
        .view(ACTIVE_PROJECTS_VIEW, &ViewOptions::all())?;

    for row in projects.rows {
        let Some(project) = Document::from_value(row.value) else {
            continue;
        };
        let Some(prefix) = project.get_str("prefix").filter(|p| !p.is_empty()) else {
            continue;
        };
        let declared = declared_collections(&project);

        for category in CollectionCategory::AUXILIARY {
            let name = format!("{}_{}", prefix, category.as_str());
            if !declared.contains(&name) {
                continue;
            }
            if let Some(collection) = open_if_present(server, &name) {
                found.push(category, collection);
            }
        }

        let corpora = public_corpora_of_project(server, prefix)?;
        found.extend(
            CollectionCategory::Corpus,
            corpora
                .into_iter()
                .filter(|corpus| declared.iter().any(|name| name == corpus.name())),
        );
    }
    Ok(found)
}

/// All active `BTSUser` documents, then (if `usergroups`) all active
/// `BTSUserGroup` documents, paged from the `admin` collection
pub fn all_active_btsusers<S: Server>(
    server: &S,
    usergroups: bool,
    config: &ReaderConfig,
) -> StoreResult<impl Iterator<Item = ViewResult<ViewItem>>> {
    let users = apply_view(server.collection(ADMIN_COLLECTION)?, ACTIVE_USERS_VIEW, config);
    let groups = if usergroups {
        Some(apply_view(
            server.collection(ADMIN_COLLECTION)?,
            ACTIVE_USERGROUPS_VIEW,
            config,
        ))
    } else {
        None
    };
    Ok(users.chain(groups.into_iter().flatten()))
}
