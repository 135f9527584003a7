//! Command Surface
//!
//! `predict <INPUT>` classifies one URL, one comma-separated feature
//! vector, or a whole `.csv` batch file; `history` shows recent ledger
//! records. Exit codes: 0 success, 1 missing/corrupt artifacts, 2 input
//! validation, 3 ledger write failure (the verdict is still printed).

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::constants;
use crate::logic::batch::{self, BatchError};
use crate::logic::ledger::{LedgerError, PredictionLedger, SqliteLedger};
use crate::logic::model::{load_classifier, load_scaler, ArtifactError};
use crate::logic::pipeline::{LedgerStatus, Pipeline, PipelineError, Prediction};
use crate::logic::verdict::Label;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ARTIFACT: i32 = 1;
pub const EXIT_INPUT: i32 = 2;
pub const EXIT_LEDGER: i32 = 3;

// ============================================================================
// ARGUMENTS
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "phishguard")]
#[command(about = "Lexical URL phishing classifier with a durable prediction ledger")]
#[command(version)]
pub struct Args {
    /// Directory holding the fitted scaler and classifier artifacts
    #[arg(long, env = "PHISHGUARD_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Path of the prediction ledger database
    #[arg(long, env = "PHISHGUARD_LEDGER")]
    pub ledger: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a URL, a comma-separated feature vector, or a .csv batch file
    Predict {
        /// Input to classify; one line is read from stdin when omitted
        input: Option<String>,

        /// Results path for batch mode (default: <input>_predictions.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show recent ledger records and the label distribution
    History {
        /// Most recent records to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
enum CliError {
    Artifact(ArtifactError),
    Input(String),
    Ledger(LedgerError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Artifact(_) => EXIT_ARTIFACT,
            Self::Input(_) => EXIT_INPUT,
            Self::Ledger(_) => EXIT_LEDGER,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Artifact(e) => write!(f, "{}", e),
            Self::Input(e) => write!(f, "{}", e),
            Self::Ledger(e) => write!(f, "{}", e),
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        Self::Input(e.to_string())
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        Self::Input(e.to_string())
    }
}

// ============================================================================
// ENTRY
// ============================================================================

/// Run the parsed command, mapping failures to exit codes.
pub fn run(args: Args) -> i32 {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn execute(args: Args) -> Result<i32, CliError> {
    let models_dir = args.models_dir.unwrap_or_else(constants::default_models_dir);
    let ledger_path = args.ledger.unwrap_or_else(constants::default_ledger_path);

    match args.command {
        Command::Predict { input, output } => {
            // Both artifacts must load before anything is served; there is
            // no untrained fallback.
            let scaler = load_scaler(&models_dir.join(constants::SCALER_FILE))
                .map_err(CliError::Artifact)?;
            let classifier = load_classifier(&models_dir.join(constants::CLASSIFIER_FILE))
                .map_err(CliError::Artifact)?;
            let ledger = SqliteLedger::open(&ledger_path).map_err(CliError::Ledger)?;

            let pipeline = Pipeline::new(Arc::new(scaler), Arc::new(classifier), Arc::new(ledger));

            let input = match input {
                Some(input) => input,
                None => read_stdin_line()?,
            };
            predict(&pipeline, &input, output)
        }

        Command::History { limit } => {
            let ledger = SqliteLedger::open(&ledger_path).map_err(CliError::Ledger)?;
            history(&ledger, limit)
        }
    }
}

// ============================================================================
// PREDICT
// ============================================================================

fn predict(pipeline: &Pipeline, input: &str, output: Option<PathBuf>) -> Result<i32, CliError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::Input("empty input".to_string()));
    }

    // Batch file
    if input.to_ascii_lowercase().ends_with(".csv") {
        let input_path = PathBuf::from(input);
        let output_path = output.unwrap_or_else(|| batch::default_output_path(&input_path));

        let outcome = batch::run_batch(pipeline, &input_path, &output_path)?;
        println!(
            "{} rows classified: {} phishing, {} legit",
            outcome.rows, outcome.phishing, outcome.legit
        );
        println!("Results written to {}", outcome.output_path.display());

        return Ok(finish_ledger_status(outcome.ledger));
    }

    // Direct feature vector or single URL
    let prediction = match parse_vector_input(input) {
        Some(values) => pipeline.predict_vector(values)?,
        None => pipeline.predict_url(input)?,
    };

    print_prediction(&prediction);
    Ok(finish_ledger_status(prediction.ledger))
}

fn print_prediction(prediction: &Prediction) {
    println!("Prediction: {}", prediction.verdict);
}

/// The verdict is already printed; a failed ledger write only degrades the
/// exit code.
fn finish_ledger_status(status: LedgerStatus) -> i32 {
    match status {
        LedgerStatus::Recorded => EXIT_OK,
        LedgerStatus::Failed(e) => {
            eprintln!("Warning: verdict was not recorded to the ledger: {}", e);
            EXIT_LEDGER
        }
    }
}

/// A comma-separated list where every token parses as a number is a direct
/// feature vector. Width is validated by the pipeline, not here.
fn parse_vector_input(input: &str) -> Option<Vec<f32>> {
    if !input.contains(',') {
        return None;
    }
    input
        .split(',')
        .map(|tok| tok.trim().parse::<f32>().ok())
        .collect()
}

fn read_stdin_line() -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::Input(format!("failed to read stdin: {}", e)))?;
    if line.trim().is_empty() {
        return Err(CliError::Input("no input provided".to_string()));
    }
    Ok(line)
}

// ============================================================================
// HISTORY
// ============================================================================

fn history(ledger: &SqliteLedger, limit: usize) -> Result<i32, CliError> {
    let records = ledger.read_all().map_err(CliError::Ledger)?;

    if records.is_empty() {
        println!("No predictions recorded yet.");
        return Ok(EXIT_OK);
    }

    let phishing = records
        .iter()
        .filter(|r| r.prediction == Label::Phishing)
        .count();
    let legit = records.len() - phishing;

    let start = records.len().saturating_sub(limit);
    for record in &records[start..] {
        println!(
            "{}  {:<8}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.prediction,
            record.features
        );
    }

    println!();
    println!(
        "{} records total: {} phishing, {} legit",
        records.len(),
        phishing,
        legit
    );
    Ok(EXIT_OK)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector_input() {
        assert_eq!(parse_vector_input("1,2,3"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(
            parse_vector_input(" 1.5 , -2 , 0 "),
            Some(vec![1.5, -2.0, 0.0])
        );
    }

    #[test]
    fn test_url_is_not_a_vector() {
        assert_eq!(parse_vector_input("http://a.com"), None);
        // Commas with non-numeric tokens stay a URL
        assert_eq!(parse_vector_input("http://a.com/x,y"), None);
        // No comma, no vector
        assert_eq!(parse_vector_input("42"), None);
    }
}
