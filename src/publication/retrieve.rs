//! Retrieval of public documents

use crate::store::{Collection, Document, StoreError};
use crate::view::{
    apply_temp_view, PagedViewReader, ProgressFn, ReaderConfig, ViewError, ViewItem, ViewResult,
    TEMP_VIEW_PUB_DOC_IDS,
};

/// Documents of one collection that pass the publication filter
///
/// Ids come from the ad-hoc id view in pages; each document is then fetched
/// on its own. That is one request per document, traded for a memory
/// footprint that does not grow with the corpus.
pub struct PublicDocuments<C: Collection> {
    ids: PagedViewReader<C>,
    fetched: u64,
    progress: Option<ProgressFn>,
    done: bool,
}

impl<C: Collection> PublicDocuments<C> {
    /// Call `progress` with the number of documents fetched so far
    pub fn with_progress(mut self, progress: impl FnMut(u64) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Number of public documents, known after the first page
    pub fn total(&self) -> Option<u64> {
        self.ids.total_rows()
    }

    fn fetch(&self, id: &str) -> ViewResult<Document> {
        self.ids
            .collection()
            .get(id)
            .map_err(ViewError::store)?
            .ok_or_else(|| {
                ViewError::store(StoreError::not_found(format!(
                    "document {} in {}",
                    id,
                    self.ids.collection().name()
                )))
            })
    }
}

impl<C: Collection> Iterator for PublicDocuments<C> {
    type Item = ViewResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let fetched = match self.ids.next()? {
                Ok(ViewItem::Id(id)) => self.fetch(&id),
                Ok(item @ ViewItem::Document(_)) => match item.id() {
                    Some(id) => self.fetch(id),
                    None => continue,
                },
                Err(e) => Err(e),
            };

            match fetched {
                Ok(doc) => {
                    self.fetched += 1;
                    if let Some(progress) = self.progress.as_mut() {
                        progress(self.fetched);
                    }
                    return Some(Ok(doc));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Every active document of `collection` whose `visibility` and
/// `revisionState` mark it public, fetched one by one
pub fn retrieve_public_documents<C: Collection>(
    collection: C,
    config: &ReaderConfig,
) -> PublicDocuments<C> {
    PublicDocuments {
        ids: apply_temp_view(collection, TEMP_VIEW_PUB_DOC_IDS, config),
        fetched: 0,
        progress: None,
        done: false,
    }
}
