//! Integration Tests for the Prediction Ledger
//!
//! The concurrency test is the direct regression for the lost-update
//! hazard: two independently opened handles appending at the same time
//! must both land.

#[cfg(test)]
mod ledger_tests {
    use std::sync::Arc;

    use crate::logic::ledger::{LogRecord, PredictionLedger, SqliteLedger};
    use crate::logic::verdict::Label;

    fn record(features: &str, prediction: Label) -> LogRecord {
        LogRecord::now(features.to_string(), prediction)
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("predictions.db")).unwrap();

        ledger.append(&record("http://a.com", Label::Legit)).unwrap();
        ledger.append(&record("http://b.com", Label::Phishing)).unwrap();

        let records = ledger.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].features, "http://a.com");
        assert_eq!(records[0].prediction, Label::Legit);
        assert_eq!(records[1].features, "http://b.com");
        assert_eq!(records[1].prediction, Label::Phishing);
    }

    #[test]
    fn test_len_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("predictions.db")).unwrap();

        assert_eq!(ledger.len().unwrap(), 0);
        for i in 0..10 {
            ledger.append(&record(&format!("http://{}.com", i), Label::Legit)).unwrap();
            assert_eq!(ledger.len().unwrap(), i + 1);
        }
    }

    #[test]
    fn test_append_order_is_read_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("predictions.db")).unwrap();

        for i in 0..20 {
            ledger.append(&record(&format!("url-{}", i), Label::Legit)).unwrap();
        }

        let records = ledger.read_all().unwrap();
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.features, format!("url-{}", i));
        }
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");

        {
            let ledger = SqliteLedger::open(&path).unwrap();
            ledger.append(&record("http://first.com", Label::Phishing)).unwrap();
        }

        let ledger = SqliteLedger::open(&path).unwrap();
        assert_eq!(ledger.len().unwrap(), 1);
        ledger.append(&record("http://second.com", Label::Legit)).unwrap();

        let records = ledger.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].features, "http://first.com");
    }

    /// Lost-update regression: two concurrent appends through two
    /// independently opened handles on the same store leave exactly 2
    /// records, never 1.
    #[test]
    fn test_concurrent_appends_both_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");

        let a = Arc::new(SqliteLedger::open(&path).unwrap());
        let b = Arc::new(SqliteLedger::open(&path).unwrap());

        let ta = {
            let a = Arc::clone(&a);
            std::thread::spawn(move || a.append(&record("http://writer-a.com", Label::Legit)))
        };
        let tb = {
            let b = Arc::clone(&b);
            std::thread::spawn(move || b.append(&record("http://writer-b.com", Label::Phishing)))
        };

        ta.join().unwrap().unwrap();
        tb.join().unwrap().unwrap();

        let records = a.read_all().unwrap();
        assert_eq!(records.len(), 2);
        let features: Vec<&str> = records.iter().map(|r| r.features.as_str()).collect();
        assert!(features.contains(&"http://writer-a.com"));
        assert!(features.contains(&"http://writer-b.com"));
    }

    /// Heavier interleaving: many writers, every record must land.
    #[test]
    fn test_many_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");

        let handles: Vec<_> = (0..8)
            .map(|w| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let ledger = SqliteLedger::open(&path).unwrap();
                    for i in 0..5 {
                        ledger
                            .append(&record(&format!("w{}-{}", w, i), Label::Legit))
                            .unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let ledger = SqliteLedger::open(&path).unwrap();
        assert_eq!(ledger.len().unwrap(), 40);
    }

    #[test]
    fn test_batch_is_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let ledger = SqliteLedger::open(&path).unwrap();

        ledger.append(&record("before", Label::Legit)).unwrap();

        let batch: Vec<LogRecord> = (0..3)
            .map(|i| record(&format!("batch-{}", i), Label::Phishing))
            .collect();
        ledger.append_batch(&batch).unwrap();

        ledger.append(&record("after", Label::Legit)).unwrap();

        let records = ledger.read_all().unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].features, "before");
        assert_eq!(records[1].features, "batch-0");
        assert_eq!(records[2].features, "batch-1");
        assert_eq!(records[3].features, "batch-2");
        assert_eq!(records[4].features, "after");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("predictions.db")).unwrap();

        ledger.append_batch(&[]).unwrap();
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn test_timestamps_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("predictions.db")).unwrap();

        let original = record("http://a.com", Label::Legit);
        ledger.append(&original).unwrap();

        let records = ledger.read_all().unwrap();
        // RFC-3339 text keeps sub-second precision
        assert_eq!(records[0].timestamp, original.timestamp);
    }
}
