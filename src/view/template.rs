//! Ad-hoc view templates
//!
//! Builds map-function source for the store's JavaScript query server.
//! Nothing here is evaluated locally. Arguments are spliced in verbatim, so
//! the returned source is only as trustworthy as its inputs: whoever can
//! choose the eClass or field paths can choose the code the store runs.

use crate::publication::{PublicationState, ACTIVE_STATE, PUBLIC_VISIBILITY};

use super::errors::{ViewError, ViewResult};

/// Root of every field path
const DOC_ROOT: &str = "doc";

/// Ad-hoc view emitting the ids of all active public documents
pub const TEMP_VIEW_PUB_DOC_IDS: &str = concat!(
    "function(doc) {\n",
    "    if (doc.state == 'active' && doc.visibility == 'public' && (",
    "doc.revisionState == 'published' || ",
    "doc.revisionState == 'transformed_awaiting_update' || ",
    "doc.revisionState == 'published-awaiting-review' || ",
    "doc.revisionState == 'published-obsolete' || ",
    "doc.revisionState == 'archived-published-obsolete'",
    ")) {\n",
    "        emit(doc.id);\n",
    "    }\n",
    "}",
);

/// `doc.revisionState == '...' || ...` over all public states
fn revision_state_condition() -> String {
    PublicationState::ALL
        .iter()
        .map(|state| format!("doc.revisionState == '{}'", state.as_str()))
        .collect::<Vec<_>>()
        .join(" || ")
}

/// Second `emit` argument (with leading comma) for the requested fields
fn emit_selection(fields: &[&str]) -> ViewResult<String> {
    let mut pairs = Vec::with_capacity(fields.len());
    let mut whole_doc = false;

    for field in fields {
        let mut segments = field.split('.');
        if segments.next() != Some(DOC_ROOT) {
            return Err(ViewError::invalid_field(field));
        }
        let key = segments.collect::<Vec<_>>().join(".");
        if key.is_empty() {
            whole_doc = true;
        } else {
            pairs.push(format!("'{}': {}", key, field));
        }
    }

    Ok(if whole_doc {
        ", doc".to_string()
    } else if pairs.is_empty() {
        String::new()
    } else {
        format!(", {{{}}}", pairs.join(", "))
    })
}

/// Ad-hoc view selecting active public documents whose eClass ends in
/// `eclass` (e.g. `BTSLemmaEntry`).
///
/// Without `fields` only `doc.id` is emitted. `"doc"` emits the whole
/// document; paths like `"doc.name"` emit an object keyed by the path below
/// `doc`. Every path must start at `doc`.
pub fn temp_view_published_docs(eclass: &str, fields: &[&str]) -> ViewResult<String> {
    let selection = emit_selection(fields)?;
    Ok(format!(
        concat!(
            "function(doc) {{\n",
            "    if (doc.eClass.split('/').pop() == '{eclass}') {{\n",
            "        if (doc.state == '{active}' && doc.visibility == '{public}' && (",
            "{states})) {{\n",
            "            emit(doc.id{selection});\n",
            "        }}\n",
            "    }}\n",
            "}}",
        ),
        eclass = eclass,
        active = ACTIVE_STATE,
        public = PUBLIC_VISIBILITY,
        states = revision_state_condition(),
        selection = selection,
    ))
}
