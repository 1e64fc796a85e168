//! Publication states

use std::fmt;

use crate::store::Document;

/// Value of `visibility` required for publication
pub const PUBLIC_VISIBILITY: &str = "public";

/// Value of `state` required of documents picked by the ad-hoc views
pub const ACTIVE_STATE: &str = "active";

/// Revision states considered ready for publication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PublicationState {
    Published,
    TransformedAwaitingUpdate,
    PublishedAwaitingReview,
    PublishedObsolete,
    ArchivedPublishedObsolete,
}

impl PublicationState {
    /// Every publication-ready state, in canonical order
    pub const ALL: [PublicationState; 5] = [
        PublicationState::Published,
        PublicationState::TransformedAwaitingUpdate,
        PublicationState::PublishedAwaitingReview,
        PublicationState::PublishedObsolete,
        PublicationState::ArchivedPublishedObsolete,
    ];

    /// The `revisionState` string
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationState::Published => "published",
            PublicationState::TransformedAwaitingUpdate => "transformed_awaiting_update",
            PublicationState::PublishedAwaitingReview => "published-awaiting-review",
            PublicationState::PublishedObsolete => "published-obsolete",
            PublicationState::ArchivedPublishedObsolete => "archived-published-obsolete",
        }
    }

    /// Parse a `revisionState`; `None` for states that are not public
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|state| state.as_str() == s)
    }
}

impl fmt::Display for PublicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Revision state strings, in canonical order
pub const PUBLIC_REVISION_STATES: [&str; 5] = [
    "published",
    "transformed_awaiting_update",
    "published-awaiting-review",
    "published-obsolete",
    "archived-published-obsolete",
];

/// Whether `visibility` and `revisionState` qualify a document for publication
///
/// The `state` field is not consulted here; only the ad-hoc views require
/// documents to be active.
pub fn is_document_public(document: &Document) -> bool {
    if document.get_str("visibility") != Some(PUBLIC_VISIBILITY) {
        return false;
    }
    document
        .get_str("revisionState")
        .and_then(PublicationState::parse)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_state_strings_agree() {
        let names: Vec<&str> = PublicationState::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, PUBLIC_REVISION_STATES.to_vec());
    }

    #[test]
    fn test_parse() {
        assert_eq!(PublicationState::parse("published"), Some(PublicationState::Published));
        assert_eq!(PublicationState::parse("published-awaiting-update"), None);
        assert_eq!(PublicationState::parse("Published"), None);
    }

    #[test]
    fn test_public_documents() {
        for state in PUBLIC_REVISION_STATES {
            let document = doc(json!({"visibility": "public", "revisionState": state}));
            assert!(is_document_public(&document));
        }
    }

    #[test]
    fn test_non_public_documents() {
        assert!(!is_document_public(&doc(json!({}))));
        assert!(!is_document_public(&doc(json!({"revisionState": "published"}))));
        assert!(!is_document_public(&doc(
            json!({"visibility": "obscured", "revisionState": "published"})
        )));
        assert!(!is_document_public(&doc(json!({"visibility": "public", "revisionState": "new"}))));
        assert!(!is_document_public(&doc(json!({"visibility": "public"}))));
        assert!(!is_document_public(&doc(json!({"visibility": "public", "revisionState": 1}))));
    }
}
