//! Batch aggregation over many reports.

mod discover;

pub use discover::{discover, duplicate_names};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractionFailure;
use crate::models::record::{Dataset, Record};
use crate::pdf::{source_id, TextExtractor};
use crate::report::FieldParser;

/// What happened to one document.
#[derive(Debug)]
pub enum DocumentStatus<'a> {
    /// Text extracted and parsed into a record.
    Processed(&'a Record),
    /// Extraction failed; the document was skipped.
    Skipped(&'a ExtractionFailure),
}

/// Receives progress notifications while a batch runs.
pub trait BatchObserver {
    /// Called once before the first document.
    fn on_start(&self, _total: usize) {}

    /// Called after each document, in input order.
    fn on_document(&self, _index: usize, _path: &Path, _status: DocumentStatus<'_>) {}

    /// Called once when the batch ends (finished or cancelled).
    fn on_finish(&self, _summary: &BatchSummary) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Counters and failures of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// Documents handed to the batch.
    pub total: usize,
    /// Documents that produced a record.
    pub processed: usize,
    /// Documents skipped because extraction failed.
    pub skipped: usize,
    /// Reasons for each skipped document, in input order.
    pub failures: Vec<ExtractionFailure>,
    /// The batch stopped before attempting every document.
    pub cancelled: bool,
    /// Wall-clock time spent.
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl BatchSummary {
    fn new(total: usize) -> Self {
        Self {
            started_at: Utc::now(),
            total,
            processed: 0,
            skipped: 0,
            failures: Vec::new(),
            cancelled: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Documents that were neither processed nor skipped.
    pub fn not_attempted(&self) -> usize {
        self.total - self.processed - self.skipped
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Records and summary of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One record per processed document, in input order.
    pub dataset: Dataset,
    /// Counters and failures.
    pub summary: BatchSummary,
}

/// Drives a [`TextExtractor`] and a [`FieldParser`] over a list of documents.
///
/// Documents are processed one at a time in the order given. A document that
/// fails extraction is skipped and reported; it never stops the batch.
pub struct BatchAggregator<E, P> {
    extractor: E,
    parser: P,
    cancel: Option<Arc<AtomicBool>>,
}

impl<E: TextExtractor, P: FieldParser> BatchAggregator<E, P> {
    /// Create an aggregator.
    pub fn new(extractor: E, parser: P) -> Self {
        Self {
            extractor,
            parser,
            cancel: None,
        }
    }

    /// Stop before the next document once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run without progress reporting.
    pub fn run(&self, paths: &[PathBuf]) -> BatchOutcome {
        self.run_with_observer(paths, &NoopObserver)
    }

    /// Run, notifying `observer` as documents complete.
    pub fn run_with_observer(&self, paths: &[PathBuf], observer: &dyn BatchObserver) -> BatchOutcome {
        let start = Instant::now();
        let mut summary = BatchSummary::new(paths.len());
        let mut dataset = Dataset::with_capacity(paths.len());

        info!(
            "Processing {} documents with {} extractor",
            paths.len(),
            self.extractor.name()
        );
        observer.on_start(paths.len());

        for (index, path) in paths.iter().enumerate() {
            if self.is_cancelled() {
                warn!(
                    "Batch cancelled, {} documents not attempted",
                    paths.len() - index
                );
                summary.cancelled = true;
                break;
            }

            info!("Processing {}...", path.display());

            match self.extractor.extract(path) {
                Ok(text) => {
                    let record = self.parser.parse(&text, &source_id(path));
                    debug!(
                        "{}: {} fields found",
                        record.source_id(),
                        record.found_count()
                    );
                    observer.on_document(index, path, DocumentStatus::Processed(&record));
                    dataset.push(record);
                    summary.processed += 1;
                }
                Err(failure) => {
                    warn!("Skipping {} due to extraction error: {}", path.display(), failure.cause);
                    observer.on_document(index, path, DocumentStatus::Skipped(&failure));
                    summary.failures.push(failure);
                    summary.skipped += 1;
                }
            }
        }

        summary.elapsed = start.elapsed();
        info!(
            "Batch finished: {} processed, {} skipped in {:?}",
            summary.processed, summary.skipped, summary.elapsed
        );
        observer.on_finish(&summary);

        BatchOutcome { dataset, summary }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use crate::error::ExtractionCause;
    use crate::models::record::{FieldName, FieldValue};
    use crate::report::ReportParser;

    /// Serves canned text per file name; unknown names fail.
    struct FakeExtractor {
        texts: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeExtractor {
        fn new(docs: &[(&str, &str)]) -> Self {
            Self {
                texts: docs
                    .iter()
                    .map(|(name, text)| (name.to_string(), text.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextExtractor for FakeExtractor {
        fn extract(&self, path: &Path) -> crate::pdf::Result<String> {
            let id = source_id(path);
            self.calls.borrow_mut().push(id.clone());
            self.texts.get(&id).cloned().ok_or_else(|| {
                ExtractionFailure::new(id, ExtractionCause::Parse("corrupt".to_string()))
            })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: RefCell<Vec<String>>,
    }

    impl BatchObserver for RecordingObserver {
        fn on_start(&self, total: usize) {
            self.events.borrow_mut().push(format!("start {total}"));
        }

        fn on_document(&self, index: usize, _path: &Path, status: DocumentStatus<'_>) {
            let event = match status {
                DocumentStatus::Processed(r) => format!("{index} ok {}", r.source_id()),
                DocumentStatus::Skipped(f) => format!("{index} skip {}", f.source_id),
            };
            self.events.borrow_mut().push(event);
        }

        fn on_finish(&self, summary: &BatchSummary) {
            self.events
                .borrow_mut()
                .push(format!("finish {}/{}", summary.processed, summary.skipped));
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/reports").join(n)).collect()
    }

    #[test]
    fn test_failed_document_is_isolated() {
        let extractor = FakeExtractor::new(&[
            ("a.pdf", "Total Valleys =10 ft"),
            ("c.pdf", "Total Valleys =30 ft"),
        ]);
        let aggregator = BatchAggregator::new(extractor, ReportParser::new());

        let outcome = aggregator.run(&paths(&["a.pdf", "b.pdf", "c.pdf"]));

        let ids: Vec<&str> = outcome.dataset.iter().map(|r| r.source_id()).collect();
        assert_eq!(ids, vec!["a.pdf", "c.pdf"]);
        assert_eq!(
            outcome.dataset[1].get(FieldName::TotalValleys),
            &FieldValue::Found("30".to_string())
        );
        assert_eq!(outcome.summary.processed, 2);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.failures[0].source_id, "b.pdf");
        assert!(!outcome.summary.cancelled);
    }

    #[test]
    fn test_empty_batch() {
        let aggregator = BatchAggregator::new(FakeExtractor::new(&[]), ReportParser::new());
        let outcome = aggregator.run(&[]);

        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.summary.processed, 0);
        assert_eq!(outcome.summary.skipped, 0);
        assert_eq!(outcome.summary.not_attempted(), 0);
    }

    #[test]
    fn test_all_failures_yield_empty_dataset() {
        let aggregator = BatchAggregator::new(FakeExtractor::new(&[]), ReportParser::new());
        let outcome = aggregator.run(&paths(&["a.pdf", "b.pdf"]));

        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.summary.skipped, 2);
    }

    #[test]
    fn test_documents_processed_in_input_order() {
        let extractor = FakeExtractor::new(&[("x.pdf", "x"), ("m.pdf", "m"), ("a.pdf", "a")]);
        let aggregator = BatchAggregator::new(extractor, ReportParser::new());

        let outcome = aggregator.run(&paths(&["x.pdf", "m.pdf", "a.pdf"]));

        let ids: Vec<&str> = outcome.dataset.iter().map(|r| r.source_id()).collect();
        assert_eq!(ids, vec!["x.pdf", "m.pdf", "a.pdf"]);
        assert_eq!(
            *aggregator.extractor.calls.borrow(),
            vec!["x.pdf".to_string(), "m.pdf".to_string(), "a.pdf".to_string()]
        );
    }

    #[test]
    fn test_observer_sees_every_document() {
        let extractor = FakeExtractor::new(&[("a.pdf", "text"), ("c.pdf", "text")]);
        let aggregator = BatchAggregator::new(extractor, ReportParser::new());
        let observer = RecordingObserver::default();

        aggregator.run_with_observer(&paths(&["a.pdf", "b.pdf", "c.pdf"]), &observer);

        assert_eq!(
            *observer.events.borrow(),
            vec![
                "start 3".to_string(),
                "0 ok a.pdf".to_string(),
                "1 skip b.pdf".to_string(),
                "2 ok c.pdf".to_string(),
                "finish 2/1".to_string(),
            ]
        );
    }

    #[test]
    fn test_cancel_flag_stops_before_next_document() {
        struct CancelAfterFirst(Arc<AtomicBool>);

        impl BatchObserver for CancelAfterFirst {
            fn on_document(&self, _index: usize, _path: &Path, _status: DocumentStatus<'_>) {
                self.0.store(true, Ordering::Relaxed);
            }
        }

        let flag = Arc::new(AtomicBool::new(false));
        let extractor = FakeExtractor::new(&[("a.pdf", "a"), ("b.pdf", "b")]);
        let aggregator =
            BatchAggregator::new(extractor, ReportParser::new()).with_cancel_flag(flag.clone());

        let outcome =
            aggregator.run_with_observer(&paths(&["a.pdf", "b.pdf"]), &CancelAfterFirst(flag));

        assert_eq!(outcome.dataset.len(), 1);
        assert!(outcome.summary.cancelled);
        assert_eq!(outcome.summary.not_attempted(), 1);
        assert_eq!(*aggregator.extractor.calls.borrow(), vec!["a.pdf".to_string()]);
    }

    #[test]
    fn test_summary_serializes_elapsed_as_millis() {
        let aggregator = BatchAggregator::new(FakeExtractor::new(&[]), ReportParser::new());
        let outcome = aggregator.run(&paths(&["a.pdf"]));

        let json = serde_json::to_value(&outcome.summary).unwrap();
        assert!(json["elapsed_ms"].is_u64());
        assert_eq!(json["failures"][0]["source_id"], "a.pdf");
        assert_eq!(json["failures"][0]["cause"]["kind"], "parse");
    }
}
