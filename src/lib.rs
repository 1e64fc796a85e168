//! aaew_couch - view queries and publication filters over a CouchDB lexicon store
//!
//! Connect to a server, enumerate and run stored or ad-hoc views page by
//! page, and pick out the documents, corpora and collections that are
//! marked public.
//!
//! ```ignore
//! use aaew_couch::connection::connect;
//! use aaew_couch::publication::retrieve_public_documents;
//! use aaew_couch::store::Server;
//! use aaew_couch::view::ReaderConfig;
//!
//! let server = connect("http://localhost:5984", Some("auth.json".as_ref()), None, None)?;
//! let wlist = server.collection("aaew_wlist")?;
//! for doc in retrieve_public_documents(wlist, &ReaderConfig::default()) {
//!     println!("{}", doc?.into_value());
//! }
//! ```

pub mod cli;
pub mod connection;
pub mod discovery;
pub mod observability;
pub mod publication;
pub mod store;
pub mod view;
