use crate::error::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;

use super::console;

/// Verdict of one scenario
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Passed,
    Partial,
    Failed,
}

impl Outcome {
    /// Contribution to the aggregate pass rate
    pub fn weight(self) -> f64 {
        match self {
            Outcome::Passed => 1.0,
            Outcome::Partial => 0.5,
            Outcome::Failed => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Partial => "PARTIAL",
            Outcome::Failed => "FAILED",
        }
    }

    /// Outcome of `passed` successes out of `total` attempts
    pub fn from_counts(passed: usize, total: usize) -> Self {
        if total > 0 && passed == total {
            Outcome::Passed
        } else if passed > 0 {
            Outcome::Partial
        } else {
            Outcome::Failed
        }
    }
}

/// Step execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub label: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}

impl StepReport {
    fn pending(label: &str) -> Self {
        Self {
            label: label.to_string(),
            status: StepStatus::Pending,
            duration_ms: None,
        }
    }
}

/// Result record of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: Outcome,
    /// Created identifiers, counts, flag states
    pub details: BTreeMap<String, String>,
    pub error: Option<String>,
    pub duration_ms: Option<u64>,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn new(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            details: BTreeMap::new(),
            error: None,
            duration_ms: None,
            steps: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_error(mut self, error: &HarnessError) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_duration(mut self, started_at: Instant) -> Self {
        self.duration_ms = Some(started_at.elapsed().as_millis() as u64);
        self
    }
}

/// A scenario made of dependent steps.
///
/// Once a step fails the chain is broken: later steps are recorded as skipped
/// and their futures are dropped without being polled.
pub struct Chain {
    name: String,
    steps: Vec<StepReport>,
    current: usize,
    broken: bool,
    started_at: Instant,
    details: BTreeMap<String, String>,
    error: Option<String>,
}

impl Chain {
    pub fn new(name: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            steps: labels.iter().map(|l| StepReport::pending(l)).collect(),
            current: 0,
            broken: false,
            started_at: Instant::now(),
            details: BTreeMap::new(),
            error: None,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Run the next step. Returns `None` when the step failed or the chain was
    /// already broken.
    pub async fn step<T, F>(&mut self, fut: F) -> Option<T>
    where
        F: Future<Output = HarnessResult<T>>,
    {
        if self.broken {
            return None;
        }
        let Some(index) = (self.current < self.steps.len()).then_some(self.current) else {
            log::warn!("{}: more steps run than declared", self.name);
            return None;
        };
        self.current += 1;

        let started = Instant::now();
        let result = fut.await;
        let step = &mut self.steps[index];
        step.duration_ms = Some(started.elapsed().as_millis() as u64);

        match result {
            Ok(value) => {
                step.status = StepStatus::Passed;
                console::step_passed(&step.label);
                Some(value)
            }
            Err(err) => {
                step.status = StepStatus::Failed {
                    error: err.to_string(),
                };
                console::step_failed(&step.label, &err);
                self.error = Some(err.to_string());
                self.broken = true;
                None
            }
        }
    }

    pub fn detail(&mut self, key: &str, value: impl ToString) {
        self.details.insert(key.to_string(), value.to_string());
    }

    pub fn finish(mut self) -> ScenarioReport {
        let reason = if self.broken {
            "previous step failed"
        } else {
            "not reached"
        };
        for step in &mut self.steps[self.current..] {
            step.status = StepStatus::Skipped {
                reason: reason.to_string(),
            };
        }

        let passed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Passed)
            .count();

        ScenarioReport {
            name: self.name,
            outcome: Outcome::from_counts(passed, self.steps.len()),
            details: self.details,
            error: self.error,
            duration_ms: Some(self.started_at.elapsed().as_millis() as u64),
            steps: self.steps,
        }
    }
}

/// A scenario made of independent status probes
pub struct ProbeSet {
    name: String,
    probes: Vec<StepReport>,
    started_at: Instant,
    details: BTreeMap<String, String>,
    error: Option<String>,
}

impl ProbeSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            probes: Vec::new(),
            started_at: Instant::now(),
            details: BTreeMap::new(),
            error: None,
        }
    }

    /// Record the result of one probe, handing back its value on success
    pub fn record<T>(&mut self, label: &str, result: HarnessResult<T>) -> Option<T> {
        let mut probe = StepReport::pending(label);
        let value = match result {
            Ok(value) => {
                probe.status = StepStatus::Passed;
                console::step_passed(label);
                Some(value)
            }
            Err(err) => {
                probe.status = StepStatus::Failed {
                    error: err.to_string(),
                };
                console::step_failed(label, &err);
                self.error.get_or_insert_with(|| err.to_string());
                None
            }
        };
        self.probes.push(probe);
        value
    }

    pub fn passed(&self) -> usize {
        self.probes
            .iter()
            .filter(|p| p.status == StepStatus::Passed)
            .count()
    }

    pub fn detail(&mut self, key: &str, value: impl ToString) {
        self.details.insert(key.to_string(), value.to_string());
    }

    pub fn finish(self) -> ScenarioReport {
        let passed = self.passed();
        let total = self.probes.len();
        console::tally(&self.name, passed, total);

        ScenarioReport {
            name: self.name,
            outcome: Outcome::from_counts(passed, total),
            details: self.details,
            error: self.error,
            duration_ms: Some(self.started_at.elapsed().as_millis() as u64),
            steps: self.probes,
        }
    }
}
