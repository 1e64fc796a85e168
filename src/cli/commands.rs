//! CLI command implementations
//!
//! Each command opens one session, streams its results as JSON lines and
//! exits. Nothing is written to the store.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::connection::{connect_with, load_credentials};
use crate::discovery::{all_active_btsusers, all_public_collections, get_projects};
use crate::publication::retrieve_public_documents;
use crate::store::{Collection, HttpServer, Server};
use crate::view::{
    apply_temp_view, apply_view, list_views, temp_view_published_docs, view_result_count,
    ViewItem, ViewResult,
};

use super::args::{Cli, Command, ConnectionArgs};
use super::config::Settings;
use super::errors::{CliError, CliResult};
use super::io::{write_raw, write_response, write_stream};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli.connection, cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(connection: &ConnectionArgs, cmd: Command) -> CliResult<()> {
    let session = || -> CliResult<(Settings, HttpServer)> {
        let settings = Settings::resolve(connection)?;
        let server = open_session(&settings)?;
        Ok((settings, server))
    };

    match cmd {
        Command::Template { eclass, fields } => template(&eclass, &fields),
        Command::Views { collection } => {
            let (_, server) = session()?;
            views(&server, &collection)
        }
        Command::Count { collection, view } => {
            let (_, server) = session()?;
            count(&server, &collection, &view)
        }
        Command::Dump {
            collection,
            view,
            temp,
        } => {
            let (settings, server) = session()?;
            dump(&server, &settings, &collection, &view, temp)
        }
        Command::PublicDocs { collection } => {
            let (settings, server) = session()?;
            public_docs(&server, &settings, &collection)
        }
        Command::Collections => {
            let (_, server) = session()?;
            collections(&server)
        }
        Command::Projects => {
            let (_, server) = session()?;
            projects(&server)
        }
        Command::Users { no_groups } => {
            let (settings, server) = session()?;
            users(&server, &settings, !no_groups)
        }
    }
}

fn open_session(settings: &Settings) -> CliResult<HttpServer> {
    let credentials = match &settings.auth_file {
        Some(path) => Some(load_credentials(path)?),
        None => settings.credentials.clone(),
    };
    Ok(connect_with(
        &settings.url,
        credentials.as_ref(),
        settings.http.clone(),
    )?)
}

fn items(
    reader: impl Iterator<Item = ViewResult<ViewItem>>,
) -> impl Iterator<Item = ViewResult<Value>> {
    reader.map(|item| item.map(ViewItem::into_value))
}

/// List stored views, one name per line
pub fn views(server: &HttpServer, collection: &str) -> CliResult<()> {
    let names = list_views(&server.collection(collection)?)?;
    write_stream(names.into_iter().map(|name| Ok::<_, CliError>(Value::String(name))))?;
    Ok(())
}

/// Print the row count of a view; -1 if it cannot be determined
pub fn count(server: &HttpServer, collection: &str, view: &str) -> CliResult<()> {
    let rows = view_result_count(&server.collection(collection)?, view);
    write_response(json!({"collection": collection, "view": view, "count": rows}))
}

/// Stream a stored view, or an ad-hoc view read from a file
pub fn dump(
    server: &HttpServer,
    settings: &Settings,
    collection: &str,
    view: &str,
    temp: bool,
) -> CliResult<()> {
    let handle = server.collection(collection)?;
    if temp {
        let source = read_source(Path::new(view))?;
        write_stream(items(apply_temp_view(handle, &source, &settings.reader)))?;
    } else {
        write_stream(items(apply_view(handle, view, &settings.reader)))?;
    }
    Ok(())
}

fn read_source(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("cannot read view source {}: {}", path.display(), e))
    })
}

/// Stream the public documents of a collection
pub fn public_docs(server: &HttpServer, settings: &Settings, collection: &str) -> CliResult<()> {
    let docs = retrieve_public_documents(server.collection(collection)?, &settings.reader);
    write_stream(docs.map(|doc| doc.map(|doc| doc.into_value())))?;
    Ok(())
}

/// Print collection names by category
pub fn collections(server: &HttpServer) -> CliResult<()> {
    let found = all_public_collections(server)?;
    let mut by_category = Map::new();
    for (category, handles) in found.iter() {
        let names: Vec<Value> = handles
            .iter()
            .map(|handle| Value::String(handle.name().to_string()))
            .collect();
        by_category.insert(category.as_str().to_string(), Value::Array(names));
    }
    write_response(Value::Object(by_category))
}

/// Stream active projects
pub fn projects(server: &HttpServer) -> CliResult<()> {
    let projects = get_projects(server)?;
    write_stream(projects.into_iter().map(Ok::<_, CliError>))?;
    Ok(())
}

/// Stream active users, and user groups unless left out
pub fn users(server: &HttpServer, settings: &Settings, usergroups: bool) -> CliResult<()> {
    let users = all_active_btsusers(server, usergroups, &settings.reader)?;
    write_stream(items(users))?;
    Ok(())
}

/// Print an ad-hoc view template
pub fn template(eclass: &str, fields: &[String]) -> CliResult<()> {
    write_raw(&template_source(eclass, fields)?)
}

fn template_source(eclass: &str, fields: &[String]) -> CliResult<String> {
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    Ok(temp_view_published_docs(eclass, &fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;

    fn fields(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_template_source() {
        let source = template_source("BTSLemmaEntry", &fields(&["doc.name"])).unwrap();
        assert!(source.contains("doc.eClass.split('/').pop() == 'BTSLemmaEntry'"));
        assert!(source.contains("emit(doc.id, {'name': doc.name});"));
    }

    #[test]
    fn test_template_rejects_field_outside_doc() {
        let err = template_source("BTSText", &fields(&["name"])).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::QueryFailed);
        assert!(err.message().contains("AAEW_VIEW_INVALID_FIELD"));
    }

    #[test]
    fn test_template_runs_without_server() {
        let cmd = Command::Template {
            eclass: "BTSText".to_string(),
            fields: fields(&["doc"]),
        };
        assert!(run_command(&ConnectionArgs::default(), cmd).is_ok());
    }

    #[test]
    fn test_server_commands_need_url() {
        let err = run_command(&ConnectionArgs::default(), Command::Projects).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }

    #[test]
    fn test_missing_view_source_file() {
        let err = read_source(Path::new("/nonexistent/aaew/view.js")).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::IoError);
        assert!(err.message().contains("/nonexistent/aaew/view.js"));
    }
}
