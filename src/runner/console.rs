//! Console output of a running suite

use crate::error::HarnessError;
use crate::report::summary::{Summary, Verdict};
use colored::Colorize;
use std::time::Duration;

use super::state::{Outcome, ScenarioReport};

const RULE_WIDTH: usize = 60;

pub fn rule() {
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn suite_started(title: &str, base_url: &str) {
    println!("{} Starting {}", "▶".green().bold(), title.bold());
    println!("  Target: {}", base_url.cyan());
    rule();
}

pub fn scenario_started(name: &str) {
    println!("\n{} {}", "●".blue().bold(), title_case(name).bold());
}

pub fn step_passed(label: &str) {
    println!("  {} {}", "✓".green(), label);
}

pub fn step_failed(label: &str, err: &HarnessError) {
    match err {
        HarnessError::ElementNotFound(_) => {
            println!("  {} {} - {}", "⚠".yellow(), label, err.to_string().yellow())
        }
        _ => println!("  {} {} - {}", "✗".red(), label, err.to_string().red()),
    }
}

pub fn note(message: &str) {
    println!("    {}", message.dimmed());
}

pub fn tally(name: &str, passed: usize, total: usize) {
    println!(
        "  {} {}: {}/{} passed",
        "Σ".blue(),
        title_case(name),
        passed,
        total
    );
}

pub fn aborted(err: &HarnessError) {
    println!("\n{} {}", "✗".red().bold(), err.to_string().red());
    if let HarnessError::Auth(_) = err {
        println!("{} Cannot proceed without login", "✗".red().bold());
    }
}

/// Final per-scenario listing, score and verdict
pub fn print_summary(reports: &[ScenarioReport], summary: &Summary, duration: Duration) {
    println!();
    rule();
    println!("{} TEST RESULTS SUMMARY", "■".blue().bold());
    rule();

    for report in reports {
        let name = title_case(&report.name);
        match report.outcome {
            Outcome::Passed => println!("{} {}: {}", "✓".green(), name, "PASSED".green()),
            Outcome::Partial => println!("{} {}: {}", "⚠".yellow(), name, "PARTIAL".yellow()),
            Outcome::Failed => {
                println!("{} {}: {}", "✗".red(), name, "FAILED".red());
                if let Some(ref error) = report.error {
                    println!("   Error: {}", error);
                }
            }
        }
    }

    println!(
        "\n{} Success Rate: {:.1}% ({}/{})",
        "◎".cyan(),
        summary.rate,
        summary.score,
        summary.total
    );
    println!("{} Duration: {:.2} seconds", "⏱".cyan(), duration.as_secs_f64());

    let verdict = Verdict::from_rate(summary.rate);
    let line = format!("\n{}", verdict.narrative());
    match verdict {
        Verdict::AllPassed => println!("{}", line.green().bold()),
        Verdict::MostlyFunctional => println!("{}", line.green()),
        Verdict::BasicFunctionality => println!("{}", line.yellow()),
        Verdict::ManyFailures => println!("{}", line.red()),
    }
}

/// `lead_management` -> `Lead Management`
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
