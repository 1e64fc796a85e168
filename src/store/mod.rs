//! Document store access
//!
//! The library talks to the store through two traits, [`Server`] and
//! [`Collection`]. [`HttpServer`] speaks the CouchDB REST API;
//! [`MemoryServer`] keeps everything in process for tests and dry runs.

mod errors;
mod http;
mod memory;
mod traits;
mod types;

pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use http::{HttpCollection, HttpOptions, HttpServer};
pub use memory::{MemoryCollection, MemoryServer, PageRequest, RequestTarget, MEMORY_VERSION};
pub use traits::{Collection, Server, DESIGN_PREFIX};
pub use types::{Credentials, Document, ViewOptions, ViewQueryResult, ViewRow};
