//! Collection categories and the grouped result of collection discovery

use std::collections::BTreeMap;
use std::fmt;

/// Kinds of collection a project publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionCategory {
    /// Text corpora, `<prefix>_corpus_<corpusPrefix>`
    Corpus,
    /// Word list, `<prefix>_wlist`
    Wlist,
    /// Thesaurus, `<prefix>_ths`
    Ths,
    /// Project administration, `<prefix>_admin`
    Admin,
}

impl CollectionCategory {
    pub const ALL: [CollectionCategory; 4] = [
        CollectionCategory::Corpus,
        CollectionCategory::Wlist,
        CollectionCategory::Ths,
        CollectionCategory::Admin,
    ];

    /// Auxiliary categories, named `<prefix>_<category>`
    pub const AUXILIARY: [CollectionCategory; 3] = [
        CollectionCategory::Wlist,
        CollectionCategory::Ths,
        CollectionCategory::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionCategory::Corpus => "corpus",
            CollectionCategory::Wlist => "wlist",
            CollectionCategory::Ths => "ths",
            CollectionCategory::Admin => "admin",
        }
    }
}

impl fmt::Display for CollectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection handles grouped by category
///
/// Every category is always present, possibly with no collections.
#[derive(Debug, Clone)]
pub struct PublicCollections<C> {
    by_category: BTreeMap<CollectionCategory, Vec<C>>,
}

impl<C> Default for PublicCollections<C> {
    fn default() -> Self {
        Self {
            by_category: CollectionCategory::ALL
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        }
    }
}

impl<C> PublicCollections<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: CollectionCategory, collection: C) {
        self.by_category.entry(category).or_default().push(collection);
    }

    pub fn extend(
        &mut self,
        category: CollectionCategory,
        collections: impl IntoIterator<Item = C>,
    ) {
        self.by_category.entry(category).or_default().extend(collections);
    }

    /// Collections of one category, in discovery order
    pub fn get(&self, category: CollectionCategory) -> &[C] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = CollectionCategory> + '_ {
        self.by_category.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CollectionCategory, &[C])> + '_ {
        self.by_category
            .iter()
            .map(|(category, collections)| (*category, collections.as_slice()))
    }

    /// Total number of collections across categories
    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
