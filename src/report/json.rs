use super::types::SuiteResults;
use anyhow::Result;
use std::path::Path;

pub const RESULTS_FILE: &str = "crm-results.json";

/// Write the results as pretty JSON, or print them when no path is given
pub fn generate(results: &SuiteResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("    Generated JSON report: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Read results written by [`generate`]
pub fn load(path: &Path) -> Result<SuiteResults> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
