//! In-memory store
//!
//! Implements the store traits without a server. Views are precomputed row
//! lists: stored views by `design/view` name, ad-hoc views by exact source
//! text. Failures can be scripted and every view request is recorded, which
//! makes paging behavior observable in tests.
//!
//! Handles are cheap clones sharing one state, like collections opened twice
//! on a real server.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::traits::{Collection, Server};
use super::types::{Credentials, Document, ViewOptions, ViewQueryResult, ViewRow};

/// Version string reported by the in-memory server
pub const MEMORY_VERSION: &str = "1.6.1-memory";

/// Which kind of view a recorded request targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    Stored(String),
    AdHoc(String),
}

/// One recorded view request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub target: RequestTarget,
    pub options: ViewOptions,
}

#[derive(Debug, Default)]
struct CollectionState {
    docs: RefCell<BTreeMap<String, Document>>,
    views: RefCell<HashMap<String, Vec<ViewRow>>>,
    temp_views: RefCell<HashMap<String, Vec<ViewRow>>>,
    failures: RefCell<VecDeque<StoreError>>,
    oom_above: Cell<Option<usize>>,
    requests: RefCell<Vec<PageRequest>>,
}

/// In-memory collection handle
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    name: String,
    state: Rc<CollectionState>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Rc::new(CollectionState::default()),
        }
    }

    /// Store a document under `id`. Non-object bodies are stored empty.
    pub fn insert_doc(&self, id: impl Into<String>, body: Value) {
        let id = id.into();
        let mut doc = Document::from_value(body).unwrap_or_default();
        doc.insert("_id", Value::String(id.clone()));
        self.state.docs.borrow_mut().insert(id, doc);
    }

    /// Define the rows a stored view returns
    pub fn define_view(&self, name: impl Into<String>, rows: Vec<ViewRow>) {
        self.state.views.borrow_mut().insert(name.into(), rows);
    }

    /// Define the rows an ad-hoc view source returns
    pub fn define_temp_view(&self, source: impl Into<String>, rows: Vec<ViewRow>) {
        self.state.temp_views.borrow_mut().insert(source.into(), rows);
    }

    /// Fail the next view request with `error`. Queued failures are consumed
    /// in order.
    pub fn fail_next(&self, error: StoreError) {
        self.state.failures.borrow_mut().push_back(error);
    }

    /// Fail every view request whose limit exceeds `max_rows` (or has no
    /// limit) with an out-of-memory error.
    pub fn fail_when_limit_above(&self, max_rows: usize) {
        self.state.oom_above.set(Some(max_rows));
    }

    /// Every view request seen so far, in order
    pub fn requests(&self) -> Vec<PageRequest> {
        self.state.requests.borrow().clone()
    }

    fn run(&self, target: RequestTarget, options: &ViewOptions) -> StoreResult<ViewQueryResult> {
        self.state.requests.borrow_mut().push(PageRequest {
            target: target.clone(),
            options: *options,
        });

        if let Some(error) = self.state.failures.borrow_mut().pop_front() {
            return Err(error);
        }

        if let Some(max_rows) = self.state.oom_above.get() {
            let requested = options.limit.unwrap_or(usize::MAX);
            if requested > max_rows {
                return Err(StoreError::out_of_memory(format!(
                    "{} rows requested, at most {} fit",
                    requested, max_rows
                )));
            }
        }

        let rows = match &target {
            RequestTarget::Stored(name) => self
                .state
                .views
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::not_found(format!("view {} in {}", name, self.name)))?,
            RequestTarget::AdHoc(source) => self
                .state
                .temp_views
                .borrow()
                .get(source)
                .cloned()
                .ok_or_else(|| {
                    StoreError::server_error("compilation_error: view source not understood")
                })?,
        };

        let total_rows = rows.len() as u64;
        let end = match options.limit {
            Some(limit) => options.skip.saturating_add(limit).min(rows.len()),
            None => rows.len(),
        };
        let page = if options.skip < end {
            rows[options.skip..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(ViewQueryResult {
            total_rows,
            offset: options.skip as u64,
            rows: page,
        })
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self.state.docs.borrow().keys().cloned().collect())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.state.docs.borrow().get(id).cloned())
    }

    fn view(&self, name: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult> {
        self.run(RequestTarget::Stored(name.to_string()), options)
    }

    fn query(&self, source: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult> {
        self.run(RequestTarget::AdHoc(source.to_string()), options)
    }
}

/// In-memory server
#[derive(Debug, Clone)]
pub struct MemoryServer {
    url: String,
    collections: BTreeMap<String, MemoryCollection>,
    locked: BTreeSet<String>,
    required: Option<Credentials>,
    session: Option<Credentials>,
    reachable: bool,
}

impl MemoryServer {
    /// A server that accepts anonymous sessions
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collections: BTreeMap::new(),
            locked: BTreeSet::new(),
            required: None,
            session: None,
            reachable: true,
        }
    }

    /// A server that only answers after logging in with `credentials`
    pub fn requiring(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            required: Some(credentials),
            ..Self::new(url)
        }
    }

    /// A server that fails every request at the transport level
    pub fn unreachable(url: impl Into<String>) -> Self {
        Self {
            reachable: false,
            ..Self::new(url)
        }
    }

    /// Create (or return the existing) collection `name`
    pub fn create(&mut self, name: &str) -> MemoryCollection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| MemoryCollection::new(name))
            .clone()
    }

    /// Keep `name` listed but refuse to open it
    pub fn lock(&mut self, name: &str) {
        self.locked.insert(name.to_string());
    }

    fn check_session(&self) -> StoreResult<()> {
        if !self.reachable {
            return Err(StoreError::transport(format!("{} is unreachable", self.url)));
        }
        match &self.required {
            Some(required) if self.session.as_ref() != Some(required) => Err(
                StoreError::unauthorized("authentication required").with_status(401),
            ),
            _ => Ok(()),
        }
    }
}

impl Server for MemoryServer {
    type Collection = MemoryCollection;

    fn url(&self) -> &str {
        &self.url
    }

    fn version(&self) -> StoreResult<String> {
        self.check_session()?;
        Ok(MEMORY_VERSION.to_string())
    }

    fn login(&mut self, credentials: &Credentials) -> StoreResult<()> {
        if !self.reachable {
            return Err(StoreError::transport(format!("{} is unreachable", self.url)));
        }
        if let Some(required) = &self.required {
            if required != credentials {
                return Err(
                    StoreError::unauthorized("Name or password is incorrect.").with_status(401)
                );
            }
        }
        self.session = Some(credentials.clone());
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.check_session().is_ok() && self.collections.contains_key(name)
    }

    fn collection(&self, name: &str) -> StoreResult<MemoryCollection> {
        self.check_session()?;
        if self.locked.contains(name) {
            return Err(StoreError::unauthorized(format!("collection {} is locked", name)));
        }
        self.collections
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("collection {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<ViewRow> {
        (0..n).map(|i| ViewRow::new(format!("d{}", i), Value::Null)).collect()
    }

    #[test]
    fn test_paging_slices_rows() {
        let coll = MemoryCollection::new("c");
        coll.define_view("d/v", rows(5));

        let page = coll.view("d/v", &ViewOptions::page(3, 10)).unwrap();
        assert_eq!(page.total_rows, 5);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].id.as_deref(), Some("d3"));

        let past_end = coll.view("d/v", &ViewOptions::page(9, 10)).unwrap();
        assert!(past_end.rows.is_empty());

        let counted = coll.view("d/v", &ViewOptions::count_only()).unwrap();
        assert_eq!(counted.total_rows, 5);
        assert!(counted.rows.is_empty());
    }

    #[test]
    fn test_unknown_views() {
        let coll = MemoryCollection::new("c");
        assert!(coll.view("x/y", &ViewOptions::all()).unwrap_err().is_not_found());
        assert!(coll.query("function(doc){", &ViewOptions::all()).unwrap_err().is_server_error());
    }

    #[test]
    fn test_scripted_failures_are_recorded() {
        let coll = MemoryCollection::new("c");
        coll.define_temp_view("src", rows(3));
        coll.fail_next(StoreError::out_of_memory("boom"));

        assert!(coll.query("src", &ViewOptions::page(0, 2)).unwrap_err().is_out_of_memory());
        assert_eq!(coll.query("src", &ViewOptions::page(0, 2)).unwrap().rows.len(), 2);
        assert_eq!(coll.requests().len(), 2);
    }

    #[test]
    fn test_oom_threshold() {
        let coll = MemoryCollection::new("c");
        coll.define_temp_view("src", rows(3));
        coll.fail_when_limit_above(2);
        assert!(coll.query("src", &ViewOptions::page(0, 3)).is_err());
        assert!(coll.query("src", &ViewOptions::all()).is_err());
        assert!(coll.query("src", &ViewOptions::page(0, 2)).is_ok());
    }

    #[test]
    fn test_documents() {
        let coll = MemoryCollection::new("c");
        coll.insert_doc("b", json!({"name": "beta"}));
        coll.insert_doc("_design/x", json!({"views": {}}));
        assert_eq!(coll.doc_ids().unwrap(), vec!["_design/x", "b"]);
        assert_eq!(coll.design_doc_ids().unwrap(), vec!["_design/x"]);
        assert_eq!(coll.get("b").unwrap().unwrap().get_str("_id"), Some("b"));
        assert!(coll.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_server_requires_login() {
        let creds = Credentials::new("u", "p");
        let mut server = MemoryServer::requiring("mem://", creds.clone());
        server.create("admin");

        assert!(server.version().is_err());
        assert!(!server.contains("admin"));
        assert!(server.login(&Credentials::new("u", "wrong")).is_err());
        server.login(&creds).unwrap();
        assert_eq!(server.version().unwrap(), MEMORY_VERSION);
        assert!(server.contains("admin"));
    }

    #[test]
    fn test_locked_collection() {
        let mut server = MemoryServer::new("mem://");
        server.create("secret");
        server.lock("secret");
        assert!(server.contains("secret"));
        assert!(server.collection("secret").is_err());
    }
}
