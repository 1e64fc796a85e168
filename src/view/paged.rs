//! Windowed view pagination
//!
//! A [`PagedViewReader`] streams the rows of a view one page at a time so a
//! large result set never has to fit in memory at once.
//!
//! # Page cycle (strict order)
//!
//! 1. Query the view with the current `skip` and `limit = window`
//! 2. Rows are pending while `skip + rows returned < total_rows`
//! 3. Ad-hoc views only: a window below its initial size grows by `window / 10`
//! 4. Advance `skip` by the current window
//! 5. Emit the page's rows
//!
//! Step 4 uses the window as adjusted in step 3. After an out-of-memory
//! shrink the window grows back while `skip` advances by the grown value,
//! so rows at the end of a recovered page can be passed over. Without a
//! shrink the window never changes and every row is emitted exactly once.
//!
//! # Failures
//!
//! - Stored views: every store error is returned as is.
//! - Ad-hoc views: a store that cannot execute the source fails with
//!   `AAEW_VIEW_CANNOT_EXECUTE`. Out of memory with a window above 4
//!   divides the window by 4 and retries the same page; at 4 or below it is
//!   fatal.
//!
//! A reader that returned an error yields nothing further.

use std::collections::VecDeque;
use std::fmt;

use serde_json::Value;

use crate::observability::Logger;
use crate::store::{Collection, Document, StoreError, ViewOptions, ViewQueryResult, ViewRow};

use super::config::{ReaderConfig, MIN_SHRINKABLE_WINDOW};
use super::errors::{ViewError, ViewResult};

/// Callback receiving the running count of emitted items
pub type ProgressFn = Box<dyn FnMut(u64)>;

/// What a reader queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSource {
    /// Stored view, `design/view`
    Stored(String),
    /// Map-function source
    AdHoc(String),
}

impl ViewSource {
    pub fn is_ad_hoc(&self) -> bool {
        matches!(self, ViewSource::AdHoc(_))
    }
}

/// One emitted row
#[derive(Debug, Clone, PartialEq)]
pub enum ViewItem {
    /// Row value annotated with the row id under `id`
    Document(Document),
    /// Bare row id, for rows without an object value
    Id(String),
}

impl ViewItem {
    pub fn id(&self) -> Option<&str> {
        match self {
            ViewItem::Document(doc) => doc.get_str("id"),
            ViewItem::Id(id) => Some(id),
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            ViewItem::Document(doc) => Some(doc),
            ViewItem::Id(_) => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            ViewItem::Document(doc) => Some(doc),
            ViewItem::Id(_) => None,
        }
    }

    /// JSON form: the document, or the id as a string
    pub fn into_value(self) -> Value {
        match self {
            ViewItem::Document(doc) => doc.into_value(),
            ViewItem::Id(id) => Value::String(id),
        }
    }

    /// Rows with a non-empty object value become documents; everything else
    /// is reduced to its id. Rows with neither are dropped.
    fn from_row(row: ViewRow) -> Option<Self> {
        let ViewRow { id, value, .. } = row;
        match Document::from_value(value) {
            Some(mut doc) if !doc.is_empty() => {
                if let Some(id) = id {
                    doc.insert("id", Value::String(id));
                }
                Some(ViewItem::Document(doc))
            }
            _ => id.map(ViewItem::Id),
        }
    }
}

/// Lazy, finite, non-restartable reader over one view
pub struct PagedViewReader<C: Collection> {
    collection: C,
    source: ViewSource,
    initial_window: usize,
    window: usize,
    skip: usize,
    pending: bool,
    total_rows: Option<u64>,
    buffer: VecDeque<ViewItem>,
    emitted: u64,
    progress: Option<ProgressFn>,
}

impl<C: Collection> PagedViewReader<C> {
    pub fn new(collection: C, source: ViewSource, config: &ReaderConfig) -> Self {
        let window = config.window_size.max(1);
        Self {
            collection,
            source,
            initial_window: window,
            window,
            skip: 0,
            pending: true,
            total_rows: None,
            buffer: VecDeque::new(),
            emitted: 0,
            progress: None,
        }
    }

    /// Call `progress` with the running item count after every emitted item
    pub fn with_progress(mut self, progress: impl FnMut(u64) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Current page size
    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Offset of the next page
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Unpaged row count, once the first page has been fetched
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows
    }

    /// Whether another page will be requested
    pub fn has_more_pages(&self) -> bool {
        self.pending
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Query one page, shrinking the window as often as memory requires
    fn query_page(&mut self) -> ViewResult<ViewQueryResult> {
        loop {
            let options = ViewOptions::page(self.skip, self.window);
            let attempt = match &self.source {
                ViewSource::Stored(name) => {
                    return self.collection.view(name, &options).map_err(ViewError::store)
                }
                ViewSource::AdHoc(source) => self.collection.query(source, &options),
            };

            match attempt {
                Ok(result) => return Ok(result),
                Err(e) if e.is_out_of_memory() => self.shrink_window(e)?,
                Err(e) if e.is_server_error() => return Err(ViewError::cannot_execute(e)),
                Err(e) => return Err(ViewError::store(e)),
            }
        }
    }

    fn shrink_window(&mut self, cause: StoreError) -> ViewResult<()> {
        if self.window <= MIN_SHRINKABLE_WINDOW {
            return Err(ViewError::out_of_memory(self.window, cause));
        }
        self.window /= 4;
        let skip = self.skip.to_string();
        let window = self.window.to_string();
        Logger::warn(
            "VIEW_WINDOW_SHRUNK",
            &[
                ("collection", self.collection.name()),
                ("skip", skip.as_str()),
                ("window_size", window.as_str()),
            ],
        );
        Ok(())
    }

    fn fetch_page(&mut self) -> ViewResult<()> {
        let page = self.query_page()?;

        self.pending = ((self.skip + page.rows.len()) as u64) < page.total_rows;
        self.total_rows = Some(page.total_rows);
        let (rows, skip) = (page.rows.len().to_string(), self.skip.to_string());
        let (total, window) = (page.total_rows.to_string(), self.window.to_string());
        Logger::trace(
            "VIEW_PAGE_FETCHED",
            &[
                ("collection", self.collection.name()),
                ("rows", rows.as_str()),
                ("skip", skip.as_str()),
                ("total_rows", total.as_str()),
                ("window_size", window.as_str()),
            ],
        );

        if self.source.is_ad_hoc() && self.window < self.initial_window {
            self.window += self.window / 10;
        }
        self.skip += self.window;

        self.buffer
            .extend(page.rows.into_iter().filter_map(ViewItem::from_row));
        Ok(())
    }
}

impl<C: Collection> Iterator for PagedViewReader<C> {
    type Item = ViewResult<ViewItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.emitted += 1;
                if let Some(progress) = self.progress.as_mut() {
                    progress(self.emitted);
                }
                return Some(Ok(item));
            }
            if !self.pending {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.pending = false;
                return Some(Err(e));
            }
        }
    }
}

impl<C: Collection> fmt::Debug for PagedViewReader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedViewReader")
            .field("collection", &self.collection.name())
            .field("source", &self.source)
            .field("window", &self.window)
            .field("skip", &self.skip)
            .field("pending", &self.pending)
            .field("emitted", &self.emitted)
            .finish()
    }
}

/// Page through a stored view. The window stays fixed.
pub fn apply_view<C: Collection>(
    collection: C,
    view_name: &str,
    config: &ReaderConfig,
) -> PagedViewReader<C> {
    PagedViewReader::new(collection, ViewSource::Stored(view_name.to_string()), config)
}

/// Page through an ad-hoc view, adapting the window to memory pressure
pub fn apply_temp_view<C: Collection>(
    collection: C,
    view_function: &str,
    config: &ReaderConfig,
) -> PagedViewReader<C> {
    PagedViewReader::new(collection, ViewSource::AdHoc(view_function.to_string()), config)
}
