//! Views: discovery, ad-hoc templates and paged reading
//!
//! Stored views are addressed as `design/view`; ad-hoc views are map-function
//! source executed by the store. Both are read through a
//! [`PagedViewReader`], which bounds memory by fetching fixed-size windows.

mod catalog;
mod config;
mod errors;
mod paged;
mod template;

pub use catalog::{list_views, view_result_count};
pub use config::{ReaderConfig, DEFAULT_WINDOW_SIZE, MIN_SHRINKABLE_WINDOW};
pub use errors::{ViewError, ViewErrorCode, ViewResult};
pub use paged::{apply_temp_view, apply_view, PagedViewReader, ProgressFn, ViewItem, ViewSource};
pub use template::{temp_view_published_docs, TEMP_VIEW_PUB_DOC_IDS};
