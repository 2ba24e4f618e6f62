use crate::report::summary::Summary;
use crate::runner::state::ScenarioReport;
use crate::runner::{Suite, SuiteRun};
use serde::{Deserialize, Serialize};

/// Exported results of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResults {
    pub session_id: String,
    pub suite: Suite,
    pub reports: Vec<ScenarioReport>,
    pub summary: Summary,
    pub duration_ms: u64,
    pub generated_at: String,
}

impl From<&SuiteRun> for SuiteResults {
    fn from(run: &SuiteRun) -> Self {
        Self {
            session_id: run.session_id.clone(),
            suite: run.suite,
            reports: run.reports.clone(),
            summary: run.summary.clone(),
            duration_ms: run.duration.as_millis() as u64,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
