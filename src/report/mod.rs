pub mod json;
pub mod junit;
pub mod summary;
pub mod types;

use crate::runner::SuiteRun;
use anyhow::{Context, Result};
use std::path::Path;

/// Export a finished run as JSON and JUnit XML into `dir`
pub fn write_reports(run: &SuiteRun, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let results = types::SuiteResults::from(run);
    json::generate(&results, Some(&dir.join(json::RESULTS_FILE)))?;
    junit::write_report(&results, dir)?;
    Ok(())
}

/// Re-render saved results in another format
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let results = json::load(results_path)
        .with_context(|| format!("Failed to read results from {}", results_path.display()))?;

    match format {
        "json" => json::generate(&results, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&results)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("    Generated JUnit report: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
