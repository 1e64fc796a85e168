//! CouchDB over HTTP
//!
//! Blocking client for the CouchDB 1.x REST API. Requests carry basic auth
//! once credentials are set; no retries and no timeouts beyond the HTTP
//! client's defaults.

use std::io::Read;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::errors::{StoreError, StoreResult};
use super::traits::{Collection, Server, DESIGN_PREFIX};
use super::types::{Credentials, Document, ViewOptions, ViewQueryResult};

/// Exit status CouchDB reports for a query server killed by the OOM killer
const OOM_EXIT_STATUS: &str = "137";

/// HTTP backend options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// Responses larger than this are treated as memory exhaustion
    pub max_response_bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CouchErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    reason: Option<Value>,
}

#[derive(Debug, Clone)]
struct Transport {
    client: Client,
    base: Url,
    credentials: Option<Credentials>,
    options: HttpOptions,
}

impl Transport {
    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|_| StoreError::transport(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let request = match &self.credentials {
            Some(creds) => request.basic_auth(&creds.user, Some(&creds.pass)),
            None => request,
        };
        request
            .send()
            .map_err(|e| StoreError::transport(e.to_string()))
    }

    /// Read a successful response body, enforcing the size limit
    ///
    /// The limit is checked while reading, so a chunked body without
    /// `Content-Length` is abandoned as soon as it grows past it.
    fn body(&self, response: Response) -> StoreResult<Vec<u8>> {
        let status = response.status();
        let bytes = match self.options.max_response_bytes {
            Some(max) => {
                if let Some(len) = response.content_length().filter(|len| *len > max) {
                    return Err(response_too_large(len, max));
                }
                let mut bytes = Vec::new();
                response
                    .take(max.saturating_add(1))
                    .read_to_end(&mut bytes)
                    .map_err(|e| StoreError::transport(e.to_string()))?;
                if bytes.len() as u64 > max {
                    return Err(response_too_large(bytes.len() as u64, max));
                }
                bytes
            }
            None => response
                .bytes()
                .map_err(|e| StoreError::transport(e.to_string()))?
                .to_vec(),
        };

        if !status.is_success() {
            return Err(classify_failure(status, &bytes));
        }
        Ok(bytes)
    }

    fn json<T: DeserializeOwned>(&self, response: Response) -> StoreResult<T> {
        let bytes = self.body(response)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::invalid_response(e.to_string()))
    }
}

fn response_too_large(read: u64, max: u64) -> StoreError {
    StoreError::out_of_memory(format!(
        "response of at least {} bytes exceeds limit of {}",
        read, max
    ))
}

/// Map a failed HTTP exchange onto the store error taxonomy
fn classify_failure(status: StatusCode, body: &[u8]) -> StoreError {
    let parsed: Option<CouchErrorBody> = serde_json::from_slice(body).ok();
    let (error, reason) = match parsed {
        Some(body) => (
            body.error.unwrap_or_default(),
            match body.reason {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            },
        ),
        None => (String::new(), String::from_utf8_lossy(body).into_owned()),
    };
    let message = if error.is_empty() {
        reason.clone()
    } else {
        format!("{}: {}", error, reason)
    };

    let err = if reports_memory_exhaustion(&error, &reason) {
        StoreError::out_of_memory(message)
    } else {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::unauthorized(message),
            StatusCode::NOT_FOUND => StoreError::not_found(message),
            _ => StoreError::server_error(message),
        }
    };
    err.with_status(status.as_u16())
}

fn reports_memory_exhaustion(error: &str, reason: &str) -> bool {
    let text = format!("{} {}", error, reason).to_lowercase();
    text.contains("memory") || (error == "os_process_error" && reason.contains(OOM_EXIT_STATUS))
}

fn page_params(options: &ViewOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![("skip", options.skip.to_string())];
    if let Some(limit) = options.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// Path segments of a document id; design documents keep their slash
fn doc_segments(id: &str) -> Vec<&str> {
    match id.strip_prefix(DESIGN_PREFIX) {
        Some(name) => vec!["_design", name],
        None => vec![id],
    }
}

/// CouchDB server handle
#[derive(Debug, Clone)]
pub struct HttpServer {
    transport: Transport,
    url: String,
}

impl HttpServer {
    /// Prepare a session against `url`. Nothing is sent yet.
    pub fn open(url: &str, options: HttpOptions) -> StoreResult<Self> {
        let base = Url::parse(url).map_err(|e| StoreError::transport(format!("{}: {}", url, e)))?;
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::transport(e.to_string()))?;
        Ok(Self {
            transport: Transport {
                client,
                base,
                credentials: None,
                options,
            },
            url: url.to_string(),
        })
    }
}

impl Server for HttpServer {
    type Collection = HttpCollection;

    fn url(&self) -> &str {
        &self.url
    }

    fn version(&self) -> StoreResult<String> {
        let url = self.transport.url(&[])?;
        let response = self.transport.send(self.transport.client.get(url))?;
        let welcome: Value = self.transport.json(response)?;
        welcome
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::invalid_response("welcome message carries no version"))
    }

    fn login(&mut self, credentials: &Credentials) -> StoreResult<()> {
        self.transport.credentials = Some(credentials.clone());
        let url = self.transport.url(&["_session"])?;
        let request = self
            .transport
            .client
            .post(url)
            .json(&json!({"name": credentials.user, "password": credentials.pass}));
        let response = self.transport.send(request)?;
        let _: Value = self.transport.json(response)?;
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        let Ok(url) = self.transport.url(&[name]) else {
            return false;
        };
        self.transport
            .send(self.transport.client.head(url))
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    fn collection(&self, name: &str) -> StoreResult<HttpCollection> {
        Ok(HttpCollection {
            transport: self.transport.clone(),
            name: name.to_string(),
        })
    }
}

/// CouchDB database handle
#[derive(Debug, Clone)]
pub struct HttpCollection {
    transport: Transport,
    name: String,
}

impl HttpCollection {
    fn all_docs(&self, params: &[(&str, &str)]) -> StoreResult<Vec<String>> {
        let url = self.transport.url(&[self.name.as_str(), "_all_docs"])?;
        let response = self
            .transport
            .send(self.transport.client.get(url).query(params))?;
        let result: ViewQueryResult = self.transport.json(response)?;
        Ok(result.rows.into_iter().filter_map(|row| row.id).collect())
    }
}

impl Collection for HttpCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc_ids(&self) -> StoreResult<Vec<String>> {
        self.all_docs(&[])
    }

    fn design_doc_ids(&self) -> StoreResult<Vec<String>> {
        self.all_docs(&[("startkey", "\"_design/\""), ("endkey", "\"_design0\"")])
    }

    fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let mut segments = vec![self.name.as_str()];
        segments.extend(doc_segments(id));
        let url = self.transport.url(&segments)?;
        let response = self.transport.send(self.transport.client.get(url))?;
        match self.transport.json::<Value>(response) {
            Ok(value) => Document::from_value(value).map(Some).ok_or_else(|| {
                StoreError::invalid_response(format!("document {} is not an object", id))
            }),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn view(&self, name: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult> {
        let (design, view) = name.split_once('/').ok_or_else(|| {
            StoreError::server_error(format!("view name {} is not of the form design/view", name))
        })?;
        let url = self
            .transport
            .url(&[self.name.as_str(), "_design", design, "_view", view])?;
        let request = self.transport.client.get(url).query(&page_params(options));
        let response = self.transport.send(request)?;
        self.transport.json(response)
    }

    fn query(&self, source: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult> {
        let url = self.transport.url(&[self.name.as_str(), "_temp_view"])?;
        let request = self
            .transport
            .client
            .post(url)
            .query(&page_params(options))
            .json(&json!({"language": "javascript", "map": source}));
        let response = self.transport.send(request)?;
        self.transport.json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_compilation_error() {
        let body =
            br#"{"error":"compilation_error","reason":"Expression does not eval to a function."}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(err.is_server_error());
        assert_eq!(err.status(), Some(400));
        assert!(err.message().contains("compilation_error"));
    }

    #[test]
    fn test_classify_memory_exhaustion() {
        let body = br#"{"error":"os_process_error","reason":"{exit_status,137}"}"#;
        assert!(classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body).is_out_of_memory());

        let body = br#"{"error":"unknown_error","reason":"out of memory"}"#;
        assert!(classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body).is_out_of_memory());
    }

    #[test]
    fn test_classify_status_codes() {
        let body = br#"{"error":"unauthorized","reason":"You are not authorized."}"#;
        let err = classify_failure(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.code(), crate::store::StoreErrorCode::Unauthorized);

        let body = br#"{"error":"not_found","reason":"missing"}"#;
        assert!(classify_failure(StatusCode::NOT_FOUND, body).is_not_found());

        let err = classify_failure(StatusCode::BAD_GATEWAY, b"<html>proxy</html>");
        assert!(err.is_server_error());
        assert!(err.message().contains("proxy"));
    }

    #[test]
    fn test_url_building() {
        let server =
            HttpServer::open("http://localhost:5984/couch/", HttpOptions::default()).unwrap();
        let url = server
            .transport
            .url(&["aaew_wlist", "_design", "wlist", "_view", "all"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5984/couch/aaew_wlist/_design/wlist/_view/all"
        );

        let url = server.transport.url(&["db", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5984/couch/db/a%20b%2Fc");
    }

    #[test]
    fn test_root_url_keeps_trailing_slash() {
        let server =
            HttpServer::open("http://localhost:5984/couch/", HttpOptions::default()).unwrap();
        assert_eq!(server.transport.url(&[]).unwrap().as_str(), "http://localhost:5984/couch/");
    }

    #[test]
    fn test_doc_segments() {
        assert_eq!(doc_segments("_design/corpus"), vec!["_design", "corpus"]);
        assert_eq!(doc_segments("abc"), vec!["abc"]);
    }

    #[test]
    fn test_page_params() {
        assert_eq!(
            page_params(&ViewOptions::page(512, 256)),
            vec![("skip", "512".to_string()), ("limit", "256".to_string())]
        );
        assert_eq!(page_params(&ViewOptions::all()), vec![("skip", "0".to_string())]);
    }

    #[test]
    fn test_open_rejects_garbage_url() {
        assert!(HttpServer::open("not a url", HttpOptions::default()).is_err());
    }

    #[test]
    fn test_unreachable_server_is_not_contained() {
        let server = HttpServer::open("http://127.0.0.1:9/", HttpOptions::default()).unwrap();
        assert!(!server.contains("admin"));
    }
}
