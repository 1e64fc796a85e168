//! Paged view reader tests
//!
//! Covers:
//! - complete, ordered pagination for any window size
//! - fixed windows for stored views
//! - shrink-and-retry on out-of-memory for ad-hoc views
//! - fatal failures: unexecutable views, memory exhaustion at the floor

use std::cell::RefCell;
use std::rc::Rc;

use aaew_couch::store::{
    MemoryCollection, PageRequest, RequestTarget, StoreError, ViewOptions, ViewRow,
};
use aaew_couch::view::{apply_temp_view, apply_view, ReaderConfig, ViewErrorCode, ViewItem};
use serde_json::{json, Value};

// =============================================================================
// Test Utilities
// =============================================================================

const STORED: &str = "wlist/all_active_lemmata";
const AD_HOC: &str = "function(doc) { emit(doc.id, doc); }";

fn id_rows(n: usize) -> Vec<ViewRow> {
    (0..n).map(|i| ViewRow::new(format!("lemma{:04}", i), Value::Null)).collect()
}

fn doc_rows(n: usize) -> Vec<ViewRow> {
    (0..n)
        .map(|i| ViewRow::new(format!("lemma{:04}", i), json!({"name": format!("name{}", i)})))
        .collect()
}

fn collection_with(rows: Vec<ViewRow>) -> MemoryCollection {
    let coll = MemoryCollection::new("aaew_wlist");
    coll.define_view(STORED, rows.clone());
    coll.define_temp_view(AD_HOC, rows);
    coll
}

fn ids(items: &[ViewItem]) -> Vec<String> {
    items.iter().map(|item| item.id().unwrap().to_string()).collect()
}

fn expected_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("lemma{:04}", i)).collect()
}

fn pages(requests: &[PageRequest]) -> Vec<(usize, usize)> {
    requests
        .iter()
        .map(|r| (r.options.skip, r.options.limit.unwrap()))
        .collect()
}

// =============================================================================
// Complete Partition
// =============================================================================

#[test]
fn test_stored_view_yields_every_row_once_for_any_window() {
    for window in 1..=12 {
        let coll = collection_with(id_rows(10));
        let items: Vec<ViewItem> = apply_view(coll, STORED, &ReaderConfig::with_window_size(window))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids(&items), expected_ids(10), "window {}", window);
    }
}

#[test]
fn test_ad_hoc_view_yields_every_row_once_for_any_window() {
    for window in [1, 3, 7, 10, 512] {
        let coll = collection_with(doc_rows(25));
        let config = ReaderConfig::with_window_size(window);
        let items: Vec<ViewItem> = apply_temp_view(coll, AD_HOC, &config)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ids(&items), expected_ids(25), "window {}", window);
    }
}

#[test]
fn test_stored_view_pages_are_fixed_windows() {
    let coll = collection_with(id_rows(10));
    let reader = apply_view(coll.clone(), STORED, &ReaderConfig::with_window_size(3));
    assert_eq!(reader.count(), 10);
    assert_eq!(pages(&coll.requests()), vec![(0, 3), (3, 3), (6, 3), (9, 3)]);
}

#[test]
fn test_exact_multiple_needs_no_extra_page() {
    let coll = collection_with(id_rows(9));
    let reader = apply_view(coll.clone(), STORED, &ReaderConfig::with_window_size(3));
    assert_eq!(reader.count(), 9);
    assert_eq!(coll.requests().len(), 3);
}

#[test]
fn test_empty_view_makes_one_request() {
    let coll = collection_with(Vec::new());
    let mut reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::default());
    assert!(reader.next().is_none());
    assert!(reader.next().is_none());
    assert_eq!(reader.total_rows(), Some(0));
    assert_eq!(coll.requests().len(), 1);
}

#[test]
fn test_reader_is_not_restartable() {
    let coll = collection_with(id_rows(2));
    let mut reader = apply_view(coll.clone(), STORED, &ReaderConfig::default());
    assert_eq!(reader.by_ref().count(), 2);
    assert!(reader.next().is_none());
    assert!(!reader.has_more_pages());
    assert_eq!(coll.requests().len(), 1);
}

// =============================================================================
// Row Shapes
// =============================================================================

#[test]
fn test_values_are_annotated_with_row_id() {
    let coll = collection_with(doc_rows(2));
    let items: Vec<ViewItem> = apply_view(coll, STORED, &ReaderConfig::default())
        .collect::<Result<_, _>>()
        .unwrap();
    let first = items[0].as_document().unwrap();
    assert_eq!(first.get_str("id"), Some("lemma0000"));
    assert_eq!(first.get_str("name"), Some("name0"));
}

#[test]
fn test_rows_without_value_yield_ids() {
    let coll = collection_with(id_rows(2));
    let items: Vec<ViewItem> = apply_view(coll, STORED, &ReaderConfig::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(items[0], ViewItem::Id("lemma0000".to_string()));
}

#[test]
fn test_progress_counts_every_item() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let coll = collection_with(id_rows(5));
    let reader = apply_view(coll, STORED, &ReaderConfig::with_window_size(2))
        .with_progress(move |n| sink.borrow_mut().push(n));
    assert_eq!(reader.count(), 5);
    assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5]);
}

// =============================================================================
// Memory Pressure
// =============================================================================

#[test]
fn test_out_of_memory_retries_same_page_with_quarter_window() {
    let coll = collection_with(id_rows(30));
    coll.fail_next(StoreError::out_of_memory("query server crashed"));

    let mut reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(100));
    assert!(reader.next().unwrap().is_ok());

    let requests = pages(&coll.requests());
    assert_eq!(requests[0], (0, 100));
    assert_eq!(requests[1], (0, 25));
}

#[test]
fn test_recovered_window_grows_before_skip_advances() {
    let coll = collection_with(id_rows(30));
    coll.fail_next(StoreError::out_of_memory("query server crashed"));

    let reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(100));
    let _ = reader.count();

    // 25 grows by 25 / 10 to 27, and the cursor moves by the grown window
    assert_eq!(pages(&coll.requests()), vec![(0, 100), (0, 25), (27, 27)]);
}

#[test]
fn test_window_growth_is_monotonic_after_shrink() {
    let coll = collection_with(id_rows(2_000));
    coll.fail_next(StoreError::out_of_memory("query server crashed"));

    let reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(100));
    let _ = reader.count();

    let limits: Vec<usize> = pages(&coll.requests()).into_iter().skip(1).map(|(_, l)| l).collect();
    assert_eq!(limits[0], 25);
    assert!(limits.windows(2).all(|w| w[0] <= w[1]), "limits {:?}", limits);
    assert!(*limits.last().unwrap() >= 100);
}

#[test]
fn test_unshrunk_ad_hoc_window_stays_fixed() {
    let coll = collection_with(id_rows(10));
    let reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(4));
    assert_eq!(reader.count(), 10);
    assert_eq!(pages(&coll.requests()), vec![(0, 4), (4, 4), (8, 4)]);
}

#[test]
fn test_out_of_memory_at_small_window_is_fatal() {
    let coll = collection_with(id_rows(10));
    coll.fail_next(StoreError::out_of_memory("query server crashed"));

    let mut reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(4));
    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.code(), ViewErrorCode::OutOfMemory);
    assert!(err.store_error().unwrap().is_out_of_memory());
    assert!(reader.next().is_none());
    assert_eq!(coll.requests().len(), 1);
}

#[test]
fn test_shrinking_stops_at_the_floor() {
    let coll = collection_with(id_rows(10));
    coll.fail_when_limit_above(0);

    let mut reader = apply_temp_view(coll.clone(), AD_HOC, &ReaderConfig::with_window_size(80));
    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.code(), ViewErrorCode::OutOfMemory);
    assert_eq!(pages(&coll.requests()), vec![(0, 80), (0, 20), (0, 5), (0, 1)]);
}

#[test]
fn test_stored_view_does_not_retry_out_of_memory() {
    let coll = collection_with(id_rows(10));
    coll.fail_next(StoreError::out_of_memory("too big"));

    let mut reader = apply_view(coll.clone(), STORED, &ReaderConfig::with_window_size(100));
    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.code(), ViewErrorCode::Store);
    assert!(reader.next().is_none());
    assert_eq!(coll.requests().len(), 1);
}

// =============================================================================
// Unexecutable Views
// =============================================================================

#[test]
fn test_syntax_error_is_cannot_execute() {
    let coll = MemoryCollection::new("admin");
    let mut reader = apply_temp_view(coll.clone(), "function(doc){", &ReaderConfig::default());

    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.code(), ViewErrorCode::CannotExecute);
    assert_eq!(err.message(), "server cannot execute view");
    assert!(reader.next().is_none());

    assert_eq!(
        coll.requests()[0].target,
        RequestTarget::AdHoc("function(doc){".to_string())
    );
}

#[test]
fn test_unauthorized_ad_hoc_view_passes_store_error_through() {
    let coll = collection_with(id_rows(3));
    coll.fail_next(StoreError::unauthorized("admin required").with_status(403));

    let mut reader = apply_temp_view(coll, AD_HOC, &ReaderConfig::default());
    let err = reader.next().unwrap().unwrap_err();
    assert_eq!(err.code(), ViewErrorCode::Store);
    assert_eq!(err.store_error().unwrap().status(), Some(403));
}

#[test]
fn test_failure_mid_stream_ends_reader() {
    let coll = collection_with(id_rows(6));
    let mut reader = apply_view(coll.clone(), STORED, &ReaderConfig::with_window_size(3));

    for _ in 0..3 {
        assert!(reader.next().unwrap().is_ok());
    }
    coll.fail_next(StoreError::transport("connection reset"));
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
    assert_eq!(
        coll.requests().last().unwrap().options,
        ViewOptions::page(3, 3)
    );
}
