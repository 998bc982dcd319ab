use clap::{Parser, Subcommand};
use fraudguard_classifiers::ClassifierKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fraudguard")]
#[command(author, version, about = "Payment fraud detection and prevention")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "FRAUDGUARD_CONFIG",
        default_value = "fraudguard.yaml"
    )]
    pub config: PathBuf,

    /// Classifier implementation: forest or heuristic
    #[arg(long, global = true, value_parser = parse_kind)]
    pub classifier: Option<ClassifierKind>,

    /// Model file for the forest classifier
    #[arg(short, long, global = true, env = "FRAUDGUARD_MODEL")]
    pub model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "FRAUDGUARD_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single transaction
    Check {
        /// Time step of the transaction
        #[arg(long, default_value = "1")]
        step: u64,

        /// Transferred amount
        #[arg(long)]
        amount: f64,

        /// Origin balance before the transaction
        #[arg(long = "oldbalance-org")]
        old_balance_origin: f64,

        /// Origin balance after the transaction
        #[arg(long = "newbalance-orig")]
        new_balance_origin: f64,

        /// Destination balance before the transaction
        #[arg(long = "oldbalance-dest")]
        old_balance_destination: f64,

        /// Destination balance after the transaction
        #[arg(long = "newbalance-dest")]
        new_balance_destination: f64,

        /// The upstream system already flagged the transaction
        #[arg(long)]
        flagged: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every row of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Concurrent evaluations (0 = one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-record timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(short = 'l', long, default_value = "0.0.0.0")]
        listen: String,

        /// Listen port
        #[arg(short = 'P', long, env = "FRAUDGUARD_PORT", default_value = "8080")]
        port: u16,
    },
}

fn parse_kind(s: &str) -> Result<ClassifierKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "forest" => Ok(ClassifierKind::Forest),
        "heuristic" => Ok(ClassifierKind::Heuristic),
        other => Err(format!(
            "unknown classifier '{}', expected forest or heuristic",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from([
            "fraudguard",
            "--classifier",
            "heuristic",
            "check",
            "--step",
            "2",
            "--amount",
            "22000",
            "--oldbalance-org",
            "21000",
            "--newbalance-orig",
            "3000",
            "--oldbalance-dest",
            "5000",
            "--newbalance-dest",
            "27000",
            "--flagged",
        ])
        .unwrap();

        assert_eq!(cli.classifier, Some(ClassifierKind::Heuristic));
        match cli.command {
            Commands::Check {
                step,
                amount,
                flagged,
                json,
                ..
            } => {
                assert_eq!(step, 2);
                assert_eq!(amount, 22000.0);
                assert!(flagged);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_batch_arguments() {
        let cli = Cli::try_parse_from([
            "fraudguard",
            "batch",
            "in.csv",
            "-o",
            "out.csv",
            "--workers",
            "4",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Batch {
                input,
                output,
                workers,
                timeout_ms,
            } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(workers, Some(4));
                assert_eq!(timeout_ms, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_classifier_rejected() {
        let result = Cli::try_parse_from(["fraudguard", "--classifier", "svm", "serve"]);
        assert!(result.is_err());
    }
}
