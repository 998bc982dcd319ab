//! Human-readable rendering of decisions and batch summaries

use fraudguard_batch::BatchSummary;
use fraudguard_policy::Assessment;
use fraudguard_telemetry::MetricsSnapshot;
use std::fmt::Write;

/// Render one assessment as aligned text
pub fn render_assessment(assessment: &Assessment) -> String {
    let verdict = &assessment.verdict;
    let prevention = &assessment.prevention;

    let label = if verdict.is_fraud { "FRAUD" } else { "LEGITIMATE" };
    let path = if verdict.rule_triggered {
        "consistency rule"
    } else {
        "classifier"
    };
    let decision = if prevention.allowed { "ALLOW" } else { "BLOCK" };

    let mut out = String::new();
    let _ = writeln!(out, "Verdict:     {} (decided by {})", label, path);
    let _ = writeln!(out, "Reasons:     {}", verdict.reason_text());
    let _ = writeln!(out, "Prevention:  {}", decision);
    let _ = writeln!(out, "Actions:     {}", prevention.justification());
    out
}

/// Render a batch summary with throughput metrics
pub fn render_summary(summary: &BatchSummary, snapshot: &MetricsSnapshot, cancelled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rows:             {}", summary.total);
    let _ = writeln!(out, "Fraud:            {}", summary.fraud);
    let _ = writeln!(out, "Pre-flagged:      {}", summary.flagged);
    let _ = writeln!(out, "Blocked:          {}", summary.blocked);
    let _ = writeln!(
        out,
        "Rule-decided:     {} ({:.1}%)",
        summary.rule_triggered,
        snapshot.rule_trigger_rate() * 100.0
    );
    let _ = writeln!(out, "Parse errors:     {}", summary.parse_errors);
    let _ = writeln!(out, "Unresolved:       {}", summary.unresolved);
    if cancelled {
        let _ = writeln!(out, "Cancelled:        {}", summary.cancelled);
    }
    let _ = writeln!(out, "Avg latency:      {}us", snapshot.avg_latency_us());
    out
}
