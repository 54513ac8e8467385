use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use reddale_game::Metric;

use super::PlaythroughResult;

fn headline(result: &PlaythroughResult) -> &str {
    result.headline.as_deref().unwrap_or("(game not finished)")
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    results: &[PlaythroughResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Playthrough Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;
    let checks: usize = results.iter().map(|r| r.checks_run).sum();

    writeln!(out, "Strategies played: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Invariant checks: {checks}")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.strategy.bold())?;
        writeln!(out, "   Outcome: {}", headline(result))?;
        let metrics = result
            .final_metrics
            .iter()
            .map(|(metric, value)| format!("{} {value}", metric.label()))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "   Final metrics: {metrics}")?;
        for round in &result.rounds {
            let marker = if round.fallback { " (fallback)" } else { "" };
            writeln!(
                out,
                "   Year {}: {} [spent {}]{marker}",
                round.round,
                round.enacted.join(", "),
                round.budget_spent
            )?;
        }

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(out: &mut W, results: &[PlaythroughResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(out: &mut W, results: &[PlaythroughResult]) -> Result<()> {
    writeln!(out, "# Reddale Playthrough Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Strategies played**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", total - passed)?;

    writeln!(out, "## Final Metrics\n")?;
    let columns: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
    writeln!(out, "| Strategy | Outcome | {} |", columns.join(" | "))?;
    writeln!(out, "|---|---|{}", "---|".repeat(columns.len()))?;
    for result in results {
        let values: Vec<String> = result
            .final_metrics
            .iter()
            .map(|(_, value)| value.to_string())
            .collect();
        writeln!(
            out,
            "| {} | {} | {} |",
            result.strategy,
            headline(result),
            values.join(" | ")
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.strategy)?;
        for round in &result.rounds {
            writeln!(
                out,
                "- **Year {}**: {} (spent {})",
                round.round,
                round.enacted.join(", "),
                round.budget_spent
            )?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
