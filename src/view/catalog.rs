//! Stored view discovery and row counts

use serde_json::Value;

use crate::observability::Logger;
use crate::store::{Collection, StoreResult, ViewOptions};

/// Names (`design/view`) of every stored view in a collection
///
/// Design documents are read one at a time; a design document that vanished
/// between listing and fetching is skipped.
pub fn list_views<C: Collection>(collection: &C) -> StoreResult<Vec<String>> {
    let mut views = Vec::new();
    for id in collection.design_doc_ids()? {
        let Some(doc) = collection.get(&id)? else {
            continue;
        };
        let design = id.rsplit('/').next().unwrap_or(&id);
        if let Some(Value::Object(defined)) = doc.get("views") {
            views.extend(defined.keys().map(|view| format!("{}/{}", design, view)));
        }
    }
    Ok(views)
}

/// Row count of a stored view or ad-hoc view source, or -1 if it cannot be
/// determined
///
/// `view` is run as a stored view if the collection defines a view of that
/// name, otherwise as ad-hoc source. Counting through an ad-hoc view usually
/// needs administrator privileges; without them the result is -1.
pub fn view_result_count<C: Collection>(collection: &C, view: &str) -> i64 {
    let counted = list_views(collection).and_then(|stored| {
        if stored.iter().any(|name| name == view) {
            collection.view(view, &ViewOptions::count_only())
        } else {
            collection.query(view, &ViewOptions::count_only())
        }
    });

    match counted {
        Ok(result) => i64::try_from(result.total_rows).unwrap_or(i64::MAX),
        Err(e) => {
            Logger::trace(
                "VIEW_COUNT_FAILED",
                &[("collection", collection.name()), ("reason", e.message())],
            );
            -1
        }
    }
}
