//! Batch orchestrator
//!
//! Evaluates every row of a batch on the tokio runtime with bounded fan-out.
//! Results come back in input order. Rows are independent: a parse failure
//! or an unresolved record affects only its own entry, while an unavailable
//! classifier aborts the whole run.

use csv::{ReaderBuilder, StringRecord, Trim};
use fraudguard_core::{Error, Result, RowParseError, TransactionRecord, FEATURE_NAMES};
use fraudguard_policy::DecisionEngine;
use fraudguard_telemetry::metrics::names;
use fraudguard_telemetry::MetricsCollector;
use futures::stream::{self, StreamExt};
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::BatchConfig;
use crate::parser::RowParser;
use crate::result::{BatchEntry, BatchResult, RowOutcome};
use crate::schema::ColumnMap;

/// A row ready for scheduling
enum PendingRow {
    Parsed(TransactionRecord),
    Failed(RowParseError),
}

/// Result of one scheduled row
enum RowStep {
    Done(RowOutcome),
    Abort(Error),
}

/// Runs batches against a shared decision engine
pub struct BatchOrchestrator {
    engine: Arc<DecisionEngine>,
    config: BatchConfig,
    metrics: MetricsCollector,
}

impl BatchOrchestrator {
    pub fn new(engine: Arc<DecisionEngine>, config: BatchConfig) -> Self {
        Self {
            engine,
            config,
            metrics: MetricsCollector::new(),
        }
    }

    /// Share an existing collector instead of a private one
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Evaluate a CSV source
    ///
    /// The header is validated before any row is read. Rows that cannot be
    /// parsed are reported in place; I/O failures of the source abort.
    pub async fn run_csv<R: Read>(&self, source: R, token: CancellationToken) -> Result<BatchResult> {
        let (headers, fields, rows) = read_source(source)?;
        self.run(headers, fields, rows, token).await
    }

    /// Evaluate records that are already typed
    pub async fn run_records(
        &self,
        records: Vec<TransactionRecord>,
        token: CancellationToken,
    ) -> Result<BatchResult> {
        let headers = FEATURE_NAMES.iter().map(|name| name.to_string()).collect();
        let fields = records.iter().map(record_fields).collect();
        let rows = records.into_iter().map(PendingRow::Parsed).collect();
        self.run(headers, fields, rows, token).await
    }

    async fn run(
        &self,
        headers: Vec<String>,
        fields: Vec<Vec<String>>,
        rows: Vec<PendingRow>,
        token: CancellationToken,
    ) -> Result<BatchResult> {
        let start = Instant::now();
        let total = rows.len();
        let workers = self.config.effective_workers();
        let timeout = self.config.record_timeout();

        info!(rows = total, workers, "Starting batch");

        let scheduling = token.clone();
        let mut steps = stream::iter(rows.into_iter().enumerate())
            .take_while(move |_| futures::future::ready(!scheduling.is_cancelled()))
            .map(|(index, row)| {
                let engine = Arc::clone(&self.engine);
                let collector = self.metrics.clone();
                async move {
                    let record = match row {
                        PendingRow::Failed(e) => return RowStep::Done(RowOutcome::ParseFailed(e)),
                        PendingRow::Parsed(record) => record,
                    };

                    let task = tokio::spawn(async move {
                        let started = Instant::now();
                        let assessed = engine.assess_within(&record, Some(timeout)).await;
                        collector.record_latency(started.elapsed().as_micros() as u64);
                        assessed
                    });

                    match task.await {
                        Ok(Ok(assessment)) => RowStep::Done(RowOutcome::Evaluated {
                            record,
                            verdict: assessment.verdict,
                            prevention: assessment.prevention,
                        }),
                        Ok(Err(e @ Error::ClassifierUnavailable(_))) => RowStep::Abort(e),
                        Ok(Err(e)) => unresolved(index, record, e),
                        Err(e) => unresolved(
                            index,
                            record,
                            Error::internal(format!("evaluation task failed: {}", e)),
                        ),
                    }
                }
            })
            .buffered(workers);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(step) = steps.next().await {
            match step {
                RowStep::Done(outcome) => {
                    self.record_outcome(&outcome);
                    outcomes.push(outcome);
                }
                RowStep::Abort(e) => {
                    error!(
                        row = outcomes.len(),
                        error = %e,
                        "Classifier unavailable, aborting batch"
                    );
                    metrics::counter!(names::BATCHES_TOTAL, "status" => "aborted").increment(1);
                    return Err(e);
                }
            }
        }
        drop(steps);

        let scheduled = outcomes.len();
        let cancelled = scheduled < total;
        if cancelled {
            warn!(
                scheduled,
                remaining = total - scheduled,
                "Batch cancelled, remaining rows not evaluated"
            );
            metrics::counter!(names::BATCH_ROWS_TOTAL, "outcome" => "cancelled")
                .increment((total - scheduled) as u64);
        }
        outcomes.resize_with(total, || RowOutcome::Cancelled);

        let entries = fields
            .into_iter()
            .zip(outcomes)
            .enumerate()
            .map(|(index, (fields, outcome))| BatchEntry {
                index,
                fields,
                outcome,
            })
            .collect();

        let result = BatchResult::new(headers, entries, cancelled);
        let status = if cancelled { "cancelled" } else { "completed" };
        metrics::counter!(names::BATCHES_TOTAL, "status" => status).increment(1);

        info!(
            rows = result.summary.total,
            fraud = result.summary.fraud,
            blocked = result.summary.blocked,
            rule_triggered = result.summary.rule_triggered,
            parse_errors = result.summary.parse_errors,
            unresolved = result.summary.unresolved,
            cancelled = result.summary.cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch finished"
        );

        Ok(result)
    }

    fn record_outcome(&self, outcome: &RowOutcome) {
        metrics::counter!(names::BATCH_ROWS_TOTAL, "outcome" => outcome.kind()).increment(1);

        match outcome {
            RowOutcome::Evaluated {
                verdict,
                prevention,
                ..
            } => self.metrics.record_evaluation(
                verdict.is_fraud,
                verdict.rule_triggered,
                prevention.allowed,
            ),
            RowOutcome::ParseFailed(e) => {
                warn!(error = %e, "Skipping unparseable row");
                self.metrics.record_parse_error();
            }
            RowOutcome::Unresolved { .. } => self.metrics.record_unresolved(),
            RowOutcome::Cancelled => {}
        }
    }
}

/// Read and parse every row of a CSV source
fn read_source<R: Read>(source: R) -> Result<(Vec<String>, Vec<Vec<String>>, Vec<PendingRow>)> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| Error::csv(format!("failed to read header: {}", e)))?
        .clone();
    let parser = RowParser::new(ColumnMap::from_headers(&headers)?);

    let mut fields = Vec::new();
    let mut rows = Vec::new();
    let mut raw = StringRecord::new();
    let mut index = 0usize;

    loop {
        match reader.read_record(&mut raw) {
            Ok(false) => break,
            Ok(true) => {
                fields.push(raw.iter().map(str::to_string).collect());
                rows.push(match parser.parse(index, &raw) {
                    Ok(record) => PendingRow::Parsed(record),
                    Err(e) => PendingRow::Failed(e),
                });
            }
            Err(e) if e.is_io_error() => {
                return Err(Error::csv(format!("failed to read row {}: {}", index, e)));
            }
            Err(e) => {
                fields.push(Vec::new());
                rows.push(PendingRow::Failed(RowParseError::unreadable(
                    index,
                    e.to_string(),
                )));
            }
        }
        index += 1;
    }

    let headers = headers.iter().map(str::to_string).collect();
    Ok((headers, fields, rows))
}

fn unresolved(index: usize, record: TransactionRecord, error: Error) -> RowStep {
    warn!(row = index, error = %error, "Record left unresolved");
    RowStep::Done(RowOutcome::Unresolved { record, error })
}

/// Source fields for a record that did not come from CSV
fn record_fields(record: &TransactionRecord) -> Vec<String> {
    vec![
        record.step().to_string(),
        record.amount().to_string(),
        record.old_balance_origin().to_string(),
        record.new_balance_origin().to_string(),
        record.old_balance_destination().to_string(),
        record.new_balance_destination().to_string(),
        u8::from(record.is_flagged_fraud()).to_string(),
    ]
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish()
    }
}
