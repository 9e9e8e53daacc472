//! CLI presentation: text and json formatters for pass results and dry-run plans.

use crate::error::MirrorError;
use crate::sync::{PassOutcome, PassResult, Plan};
use serde_json::json;

pub fn format_pass_result_text(result: &PassResult) -> String {
    let status = match &result.outcome {
        PassOutcome::Completed if result.is_converged() => "Replica already up to date".to_string(),
        PassOutcome::Completed => "Pass completed".to_string(),
        PassOutcome::Cancelled => "Pass cancelled".to_string(),
        PassOutcome::Aborted(reason) => format!("Pass aborted: {}", reason),
    };
    let mut s = format!(
        "{}\n  Changes: {}\n  Type conflicts: {}\n  Removals: {}\n  Failures: {}\n  Elapsed: {} ms",
        status,
        result.mutation_count(),
        result.conflict_count(),
        result.removal_count(),
        result.failures.len(),
        result.elapsed.as_millis()
    );
    if !result.failures.is_empty() {
        s.push_str(&format!("\n\nFailures ({}):", result.failures.len()));
        for failure in &result.failures {
            s.push_str(&format!("\n  - {}", failure));
        }
    }
    s
}

pub fn format_pass_result_json(result: &PassResult) -> Result<String, MirrorError> {
    let out = json!({
        "summary": {
            "changes": result.mutation_count(),
            "conflicts": result.conflict_count(),
            "removals": result.removal_count(),
            "failures": result.failures.len(),
        },
        "result": result,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| MirrorError::ConfigError(format!("Failed to render result: {}", e)))
}

pub fn format_plan_text(plan: &Plan) -> String {
    if plan.is_empty() {
        return "Dry run: replica already up to date".to_string();
    }
    let mut lines = vec![format!("Dry run: {} planned change(s)", plan.actions.len())];
    lines.extend(plan.actions.iter().map(|action| format!("  {}", action)));
    if !plan.failures.is_empty() {
        lines.push(String::new());
        lines.push(format!("Problems ({}):", plan.failures.len()));
        lines.extend(plan.failures.iter().map(|failure| format!("  - {}", failure)));
    }
    lines.join("\n")
}

pub fn format_plan_json(plan: &Plan) -> Result<String, MirrorError> {
    serde_json::to_string_pretty(plan)
        .map_err(|e| MirrorError::ConfigError(format!("Failed to render plan: {}", e)))
}
