//! Terminal and JSON rendering of run results

use colored::Colorize;
use netpatch_core::{
    ApplyError, Outcome, Report, ResolvedSubscription, SubscriptionRequest, Summary, Unresolved,
};
use serde_json::{json, Value};

/// One line per outcome
pub fn outcome_line(request: &SubscriptionRequest, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied { route } => format!("{} Adding: {}", "✓".green(), route),
        Outcome::ApplyFailed {
            error: ApplyError::Cancelled,
            route,
        } => format!("{} Skipped (cancelled): {}", "-".yellow(), route),
        Outcome::ApplyFailed { route, error } => {
            format!("{} Failed: {}: {}", "✗".red(), route, error)
        }
        Outcome::Unresolved { reason } => unresolved_line(request, reason),
    }
}

fn unresolved_line(request: &SubscriptionRequest, reason: &Unresolved) -> String {
    format!(
        "{} Skipped: {} ({})",
        "?".yellow(),
        request,
        reason.to_string().yellow()
    )
}

pub fn summary_line(summary: &Summary) -> String {
    let applied = format!("{} applied", summary.applied);
    let failed = format!("{} failed", summary.failed);
    let unresolved = format!("{} unresolved", summary.unresolved);

    format!(
        "{}, {}, {} ({} requested)",
        if summary.applied > 0 {
            applied.green()
        } else {
            applied.normal()
        },
        if summary.failed > 0 {
            failed.red()
        } else {
            failed.normal()
        },
        if summary.unresolved > 0 {
            unresolved.yellow()
        } else {
            unresolved.normal()
        },
        summary.requested
    )
}

/// `requests` and the report share order and length
pub fn print_report(requests: &[SubscriptionRequest], report: &Report) {
    for (request, outcome) in requests.iter().zip(report.iter()) {
        println!("  {}", outcome_line(request, outcome));
    }
    println!();
    println!("{} {}", "netpatch".cyan().bold(), summary_line(&report.summary()));
}

/// Machine-readable report, each outcome paired with its request
pub fn report_json(requests: &[SubscriptionRequest], report: &Report) -> Value {
    let outcomes: Vec<Value> = requests
        .iter()
        .zip(report.iter())
        .map(|(request, outcome)| {
            json!({
                "request": request,
                "outcome": outcome,
            })
        })
        .collect();

    json!({
        "summary": report.summary(),
        "outcomes": outcomes,
    })
}

/// Resolution results of `check`, one entry per request
pub fn check_json(
    requests: &[SubscriptionRequest],
    results: &[Result<ResolvedSubscription<'_>, Unresolved>],
) -> Value {
    let entries: Vec<Value> = requests
        .iter()
        .zip(results)
        .map(|(request, result)| match result {
            Ok(resolved) => json!({ "request": request, "route": resolved.route() }),
            Err(reason) => json!({ "request": request, "unresolved": reason }),
        })
        .collect();
    Value::Array(entries)
}

/// Resolution-only line used by `check`
pub fn check_line(request: &SubscriptionRequest, result: Result<(), &Unresolved>) -> String {
    match result {
        Ok(()) => format!("{} {}", "✓".green(), request),
        Err(reason) => unresolved_line(request, reason),
    }
}
