//! Batch Files - CSV in, CSV-plus-Prediction out
//!
//! A batch file is either the 48 feature slots in canonical order (a
//! header row, when present, must equal the canonical names in order; no
//! reordering tolerated) or a single column of raw URLs. The output is the
//! same rows with one appended `Prediction` column.
//!
//! CSV handling is RFC-4180-style: quoted fields, doubled quotes, CRLF.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::pipeline::{BatchInput, LedgerStatus, Pipeline, PipelineError};
use crate::logic::verdict::Verdict;

/// Header of the output's appended column
const PREDICTION_COLUMN: &str = "Prediction";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum BatchError {
    /// Reading or writing a batch file failed
    Io(String),
    /// The file does not match the expected schema
    Schema(String),
    /// The pipeline rejected the batch
    Pipeline(String),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Batch file IO error: {}", e),
            Self::Schema(e) => write!(f, "Batch file schema error: {}", e),
            Self::Pipeline(e) => write!(f, "Batch rejected: {}", e),
        }
    }
}

impl std::error::Error for BatchError {}

// ============================================================================
// PARSED BATCH FILE
// ============================================================================

/// A parsed batch file, keeping the raw cells so the output can reproduce
/// the input rows verbatim.
#[derive(Debug, Clone)]
pub struct BatchFile {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub inputs: Vec<BatchInput>,
}

/// Parse and validate a batch file.
pub fn read_batch_file(path: &Path) -> Result<BatchFile, BatchError> {
    let content = fs::read_to_string(path).map_err(|e| BatchError::Io(e.to_string()))?;
    let mut rows = parse_csv(&content)?;

    if rows.is_empty() {
        return Err(BatchError::Schema("file has no rows".to_string()));
    }

    let width = rows[0].len();
    match width {
        FEATURE_COUNT => {
            let header = take_feature_header(&mut rows)?;
            if rows.is_empty() {
                return Err(BatchError::Schema("file has a header but no data rows".to_string()));
            }
            let inputs = parse_feature_rows(&rows)?;
            Ok(BatchFile { header, rows, inputs })
        }
        1 => {
            // Single-column URL mode; an optional "url" header is tolerated
            let header = if rows[0][0].eq_ignore_ascii_case("url") {
                Some(rows.remove(0))
            } else {
                None
            };
            if rows.is_empty() {
                return Err(BatchError::Schema("file has a header but no data rows".to_string()));
            }
            for (i, row) in rows.iter().enumerate() {
                if row.len() != 1 {
                    return Err(BatchError::Schema(format!(
                        "row {}: expected 1 column, got {}",
                        i + 1,
                        row.len()
                    )));
                }
            }
            let inputs = rows
                .iter()
                .map(|row| BatchInput::Url(row[0].clone()))
                .collect();
            Ok(BatchFile { header, rows, inputs })
        }
        other => Err(BatchError::Schema(format!(
            "expected {} feature columns or 1 URL column, got {}",
            FEATURE_COUNT, other
        ))),
    }
}

/// Consume a header row if the first row is non-numeric. A header must
/// equal the canonical feature names in canonical order.
fn take_feature_header(rows: &mut Vec<Vec<String>>) -> Result<Option<Vec<String>>, BatchError> {
    let looks_like_header = rows[0].iter().any(|cell| cell.trim().parse::<f32>().is_err());
    if !looks_like_header {
        return Ok(None);
    }

    let header = rows.remove(0);
    for (i, (cell, expected)) in header.iter().zip(FEATURE_LAYOUT.iter()).enumerate() {
        if cell.trim() != *expected {
            return Err(BatchError::Schema(format!(
                "header column {} is {:?}, expected {:?} (canonical order required)",
                i, cell, expected
            )));
        }
    }
    Ok(Some(header))
}

fn parse_feature_rows(rows: &[Vec<String>]) -> Result<Vec<BatchInput>, BatchError> {
    let mut inputs = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != FEATURE_COUNT {
            return Err(BatchError::Schema(format!(
                "row {}: expected {} columns, got {}",
                i + 1,
                FEATURE_COUNT,
                row.len()
            )));
        }
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        for (j, cell) in row.iter().enumerate() {
            let value: f32 = cell.trim().parse().map_err(|_| {
                BatchError::Schema(format!("row {} column {}: {:?} is not a number", i + 1, j, cell))
            })?;
            values.push(value);
        }
        inputs.push(BatchInput::Vector(values));
    }
    Ok(inputs)
}

// ============================================================================
// BATCH RUN
// ============================================================================

/// Summary of a completed batch run
#[derive(Debug)]
pub struct BatchOutcome {
    pub rows: usize,
    pub phishing: usize,
    pub legit: usize,
    pub ledger: LedgerStatus,
    pub output_path: PathBuf,
}

/// Default results path: `<stem>_predictions.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("batch");
    input.with_file_name(format!("{}_predictions.csv", stem))
}

/// Run a whole batch file through the pipeline and write the results file.
pub fn run_batch(
    pipeline: &Pipeline,
    input_path: &Path,
    output_path: &Path,
) -> Result<BatchOutcome, BatchError> {
    let batch = read_batch_file(input_path)?;

    let result = pipeline.predict_batch(&batch.inputs).map_err(|e| match e {
        PipelineError::InputValidation(msg) => BatchError::Schema(msg),
        other => BatchError::Pipeline(other.to_string()),
    })?;

    write_results(output_path, &batch, &result.verdicts)?;

    let phishing = result.verdicts.iter().filter(|v| v.is_phishing()).count();
    log::info!(
        "Batch complete: {} rows ({} phishing, {} legit) -> {}",
        batch.rows.len(),
        phishing,
        batch.rows.len() - phishing,
        output_path.display()
    );

    Ok(BatchOutcome {
        rows: batch.rows.len(),
        phishing,
        legit: batch.rows.len() - phishing,
        ledger: result.ledger,
        output_path: output_path.to_path_buf(),
    })
}

/// Write the input rows back out with the Prediction column appended.
fn write_results(path: &Path, batch: &BatchFile, verdicts: &[Verdict]) -> Result<(), BatchError> {
    let mut out = String::new();

    if let Some(header) = &batch.header {
        let mut cells: Vec<String> = header.clone();
        cells.push(PREDICTION_COLUMN.to_string());
        out.push_str(&format_csv_row(&cells));
        out.push('\n');
    }

    for (row, verdict) in batch.rows.iter().zip(verdicts.iter()) {
        let mut cells: Vec<String> = row.clone();
        cells.push(verdict.label.as_str().to_string());
        out.push_str(&format_csv_row(&cells));
        out.push('\n');
    }

    fs::write(path, out).map_err(|e| BatchError::Io(e.to_string()))
}

// ============================================================================
// CSV ENCODING / DECODING
// ============================================================================

/// Parse CSV text into rows of cells. Handles quoted fields, doubled
/// quotes, and CRLF line endings. A trailing newline does not produce an
/// empty row.
pub fn parse_csv(input: &str) -> Result<Vec<Vec<String>>, BatchError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => {
                row.push(std::mem::take(&mut field));
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(BatchError::Schema("unterminated quoted field".to_string()));
    }

    // Flush a final line without a trailing newline
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    // Drop rows that are entirely empty (blank lines)
    rows.retain(|r| !(r.len() == 1 && r[0].is_empty()));

    Ok(rows)
}

/// Encode one row, quoting any cell containing a comma, quote, or newline.
pub fn format_csv_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| {
            if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
            {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::logic::ledger::{LedgerError, LogRecord, PredictionLedger};
    use crate::logic::model::{Classifier, DimensionMismatchError, Scaler};
    use crate::logic::verdict::{Label, Verdict};

    struct PassThroughScaler;

    impl Scaler for PassThroughScaler {
        fn transform(&self, values: &[f32]) -> Result<Vec<f32>, DimensionMismatchError> {
            Ok(values.to_vec())
        }
        fn width(&self) -> usize {
            FEATURE_COUNT
        }
    }

    /// Phishing iff slot 0 > 0
    struct SlotZeroClassifier;

    impl Classifier for SlotZeroClassifier {
        fn classify(&self, values: &[f32]) -> Result<Verdict, DimensionMismatchError> {
            let label = if values[0] > 0.0 { Label::Phishing } else { Label::Legit };
            Ok(Verdict::new(label, None))
        }
        fn width(&self) -> usize {
            FEATURE_COUNT
        }
    }

    #[derive(Default)]
    struct MemoryLedger {
        records: Mutex<Vec<LogRecord>>,
    }

    impl PredictionLedger for MemoryLedger {
        fn append(&self, record: &LogRecord) -> Result<(), LedgerError> {
            self.records.lock().push(record.clone());
            Ok(())
        }
        fn append_batch(&self, records: &[LogRecord]) -> Result<(), LedgerError> {
            self.records.lock().extend_from_slice(records);
            Ok(())
        }
        fn read_all(&self) -> Result<Vec<LogRecord>, LedgerError> {
            Ok(self.records.lock().clone())
        }
        fn len(&self) -> Result<u64, LedgerError> {
            Ok(self.records.lock().len() as u64)
        }
    }

    fn test_pipeline(ledger: Arc<MemoryLedger>) -> Pipeline {
        Pipeline::new(Arc::new(PassThroughScaler), Arc::new(SlotZeroClassifier), ledger)
    }

    fn feature_row(first: f32) -> String {
        let mut cells = vec![first.to_string()];
        cells.extend(std::iter::repeat("0".to_string()).take(FEATURE_COUNT - 1));
        cells.join(",")
    }

    // --- CSV primitives ---

    #[test]
    fn test_parse_csv_basic() {
        let rows = parse_csv("a,b,c\n1,2,3\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_csv_quoted() {
        let rows = parse_csv("\"a,b\",\"say \"\"hi\"\"\"\nplain,x").unwrap();
        assert_eq!(rows[0], vec!["a,b", "say \"hi\""]);
        assert_eq!(rows[1], vec!["plain", "x"]);
    }

    #[test]
    fn test_parse_csv_crlf() {
        let rows = parse_csv("a,b\r\nc,d\r\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_parse_csv_unterminated_quote() {
        assert!(parse_csv("\"oops").is_err());
    }

    #[test]
    fn test_format_csv_row_quotes() {
        let row = vec!["a,b".to_string(), "q\"q".to_string(), "plain".to_string()];
        assert_eq!(format_csv_row(&row), "\"a,b\",\"q\"\"q\",plain");
    }

    // --- Schema validation ---

    #[test]
    fn test_feature_file_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        std::fs::write(&path, format!("{}\n{}\n", feature_row(1.0), feature_row(0.0))).unwrap();

        let batch = read_batch_file(&path).unwrap();
        assert!(batch.header.is_none());
        assert_eq!(batch.inputs.len(), 2);
        assert!(matches!(batch.inputs[0], BatchInput::Vector(_)));
    }

    #[test]
    fn test_feature_file_with_canonical_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        let header = FEATURE_LAYOUT.join(",");
        std::fs::write(&path, format!("{}\n{}\n", header, feature_row(0.0))).unwrap();

        let batch = read_batch_file(&path).unwrap();
        assert!(batch.header.is_some());
        assert_eq!(batch.inputs.len(), 1);
    }

    #[test]
    fn test_reordered_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");

        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(0, 1);
        std::fs::write(&path, format!("{}\n{}\n", names.join(","), feature_row(0.0))).unwrap();

        let result = read_batch_file(&path);
        assert!(matches!(result, Err(BatchError::Schema(_))));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        std::fs::write(&path, "1,2,3\n").unwrap();

        let result = read_batch_file(&path);
        assert!(matches!(result, Err(BatchError::Schema(_))));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        let mut row: Vec<String> = vec!["x".to_string()];
        row.extend(std::iter::repeat("0".to_string()).take(FEATURE_COUNT - 1));
        // Non-numeric first row that is not the canonical header
        std::fs::write(&path, format!("{}\n", row.join(","))).unwrap();

        let result = read_batch_file(&path);
        assert!(matches!(result, Err(BatchError::Schema(_))));
    }

    #[test]
    fn test_url_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        std::fs::write(&path, "url\nhttp://a.com\nhttp://b.com\n").unwrap();

        let batch = read_batch_file(&path).unwrap();
        assert_eq!(batch.inputs.len(), 2);
        assert!(matches!(&batch.inputs[0], BatchInput::Url(u) if u == "http://a.com"));
    }

    // --- End-to-end run ---

    #[test]
    fn test_run_batch_appends_prediction_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, format!("{}\n{}\n", feature_row(1.0), feature_row(0.0))).unwrap();

        let ledger = Arc::new(MemoryLedger::default());
        let pipeline = test_pipeline(ledger.clone());

        let outcome = run_batch(&pipeline, &input, &output).unwrap();
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.phishing, 1);
        assert_eq!(outcome.legit, 1);
        assert!(outcome.ledger.is_recorded());

        // One ledger row per batch row
        assert_eq!(ledger.len().unwrap(), 2);

        let written = std::fs::read_to_string(&output).unwrap();
        let rows = parse_csv(&written).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), FEATURE_COUNT + 1);
        assert_eq!(rows[0].last().unwrap(), "Phishing");
        assert_eq!(rows[1].last().unwrap(), "Legit");
    }

    #[test]
    fn test_run_batch_keeps_header_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.csv");
        let output = dir.path().join("out.csv");
        let header = FEATURE_LAYOUT.join(",");
        std::fs::write(&input, format!("{}\n{}\n", header, feature_row(0.0))).unwrap();

        let pipeline = test_pipeline(Arc::new(MemoryLedger::default()));
        run_batch(&pipeline, &input, &output).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let rows = parse_csv(&written).unwrap();
        assert_eq!(rows[0].last().unwrap(), "Prediction");
        assert_eq!(rows[0][0], "url_len");
    }

    #[test]
    fn test_run_batch_bad_file_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "1,2,3\n").unwrap();

        let ledger = Arc::new(MemoryLedger::default());
        let pipeline = test_pipeline(ledger.clone());

        assert!(run_batch(&pipeline, &input, &output).is_err());
        assert_eq!(ledger.len().unwrap(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_default_output_path() {
        let p = default_output_path(Path::new("/data/sample_urls.csv"));
        assert_eq!(p, Path::new("/data/sample_urls_predictions.csv"));
    }
}
