//! Store traits
//!
//! Everything above this seam is generic over a server and its collections,
//! so the same code runs against CouchDB over HTTP or the in-memory store.

use super::errors::StoreResult;
use super::types::{Credentials, Document, ViewOptions, ViewQueryResult};

/// Id prefix of design documents
pub const DESIGN_PREFIX: &str = "_design/";

/// A database inside the store
pub trait Collection {
    /// Collection name as known to the server
    fn name(&self) -> &str;

    /// Ids of every document, design documents included
    fn doc_ids(&self) -> StoreResult<Vec<String>>;

    /// Ids of design documents only
    fn design_doc_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .doc_ids()?
            .into_iter()
            .filter(|id| id.starts_with(DESIGN_PREFIX))
            .collect())
    }

    /// Fetch a full document; `Ok(None)` if it does not exist
    fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Query a stored view by `design/view` name
    fn view(&self, name: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult>;

    /// Run an ad-hoc view from map-function source
    ///
    /// The source is evaluated by the store, not by this library.
    fn query(&self, source: &str, options: &ViewOptions) -> StoreResult<ViewQueryResult>;
}

/// A store server
pub trait Server {
    type Collection: Collection;

    /// Base URL (or label) of the server
    fn url(&self) -> &str;

    /// Server version; fails if the session is not usable
    fn version(&self) -> StoreResult<String>;

    /// Attach credentials and perform the login handshake
    fn login(&mut self, credentials: &Credentials) -> StoreResult<()>;

    /// Whether a collection exists. Lookup failures count as absent.
    fn contains(&self, name: &str) -> bool;

    /// Open a collection handle
    fn collection(&self, name: &str) -> StoreResult<Self::Collection>;
}
