//! Session setup
//!
//! Credentials come from an auth file or explicit parameters, in that order.
//! A session is only handed out after the version check succeeded.

use std::fs;
use std::io;
use std::path::Path;

use crate::observability::Logger;
use crate::store::{Credentials, HttpOptions, HttpServer, Server, StoreError};

use super::errors::{ConnectError, ConnectResult};

/// Read `{"user": ..., "pass": ...}` from `path`
pub fn load_credentials(path: &Path) -> ConnectResult<Credentials> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConnectError::AuthFileNotFound(path.to_path_buf()),
        _ => ConnectError::AuthFileUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    serde_json::from_str(&content).map_err(|e| ConnectError::AuthFileInvalid {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Pick credentials: the auth file if given, else `user` and `passwd` if
/// both are given, else none
pub fn resolve_credentials(
    auth_file: Option<&Path>,
    user: Option<&str>,
    passwd: Option<&str>,
) -> ConnectResult<Option<Credentials>> {
    if let Some(path) = auth_file {
        return load_credentials(path).map(Some);
    }
    Ok(match (user, passwd) {
        (Some(user), Some(passwd)) => Some(Credentials::new(user, passwd)),
        _ => None,
    })
}

/// Log in (if credentials are given) and check the server version
pub fn establish<S: Server>(mut server: S, credentials: Option<&Credentials>) -> ConnectResult<S> {
    let checked = match credentials {
        Some(creds) => server.login(creds).and_then(|_| server.version()),
        None => server.version(),
    };

    match checked {
        Ok(_) => Ok(server),
        Err(cause) => Err(connection_failed(server.url(), cause)),
    }
}

fn connection_failed(url: &str, cause: StoreError) -> ConnectError {
    Logger::error("CONNECT_FAILED", &[("reason", cause.message()), ("url", url)]);
    ConnectError::ConnectionFailed {
        url: url.to_string(),
        cause,
    }
}

/// Open an HTTP session with already resolved credentials
pub fn connect_with(
    url: &str,
    credentials: Option<&Credentials>,
    options: HttpOptions,
) -> ConnectResult<HttpServer> {
    let server = HttpServer::open(url, options).map_err(|cause| connection_failed(url, cause))?;
    establish(server, credentials)
}

/// Connect to the CouchDB server at `url`
///
/// `auth_file` is a JSON file holding an object with the keys `user` and
/// `pass`. Without it, `user` and `passwd` are used if both are given.
/// A missing auth file fails with [`ConnectError::AuthFileNotFound`]; every
/// server-side failure is a [`ConnectError::ConnectionFailed`].
pub fn connect(
    url: &str,
    auth_file: Option<&Path>,
    user: Option<&str>,
    passwd: Option<&str>,
) -> ConnectResult<HttpServer> {
    let credentials = resolve_credentials(auth_file, user, passwd)?;
    connect_with(url, credentials.as_ref(), HttpOptions::default())
}
