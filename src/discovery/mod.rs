//! Discovery of projects, public collections and users

mod collections;
mod projects;

pub use collections::{CollectionCategory, PublicCollections};
pub use projects::{
    all_active_btsusers, all_public_collections, get_projects, public_corpora_of_project,
    ACTIVE_CORPORA_VIEW, ACTIVE_PROJECTS_VIEW, ACTIVE_USERGROUPS_VIEW, ACTIVE_USERS_VIEW,
    ADMIN_COLLECTION,
};
