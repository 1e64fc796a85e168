//! Publication filters
//!
//! A document is public iff `visibility == "public"` and its
//! `revisionState` is one of the [`PublicationState`]s.

mod retrieve;
mod state;

pub use retrieve::{retrieve_public_documents, PublicDocuments};
pub use state::{
    is_document_public, PublicationState, ACTIVE_STATE, PUBLIC_REVISION_STATES, PUBLIC_VISIBILITY,
};
