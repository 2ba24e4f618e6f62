//! Result aggregation and exit policies

use crate::runner::state::{Outcome, ScenarioReport};
use serde::{Deserialize, Serialize};

pub const ALL_PASSED_RATE: f64 = 100.0;
pub const MOSTLY_FUNCTIONAL_RATE: f64 = 80.0;
pub const BASIC_FUNCTIONALITY_RATE: f64 = 50.0;

/// Pass-rate floor of the lenient exit policy
pub const LENIENT_FLOOR: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub partial: usize,
    pub failed: usize,
    /// Weighted number of passed scenarios
    pub score: f64,
    /// Weighted pass rate in percent
    pub rate: f64,
}

/// Count outcomes and compute the weighted pass rate
pub fn aggregate(reports: &[ScenarioReport]) -> Summary {
    let (passed, partial, failed) =
        reports
            .iter()
            .fold((0, 0, 0), |(p, h, f), report| match report.outcome {
                Outcome::Passed => (p + 1, h, f),
                Outcome::Partial => (p, h + 1, f),
                Outcome::Failed => (p, h, f + 1),
            });

    let score: f64 = reports.iter().map(|r| r.outcome.weight()).sum();
    let total = reports.len();
    let rate = if total > 0 {
        score / total as f64 * 100.0
    } else {
        0.0
    };

    Summary {
        total,
        passed,
        partial,
        failed,
        score,
        rate,
    }
}

/// Narrative verdict for a pass rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AllPassed,
    MostlyFunctional,
    BasicFunctionality,
    ManyFailures,
}

impl Verdict {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= ALL_PASSED_RATE {
            Verdict::AllPassed
        } else if rate >= MOSTLY_FUNCTIONAL_RATE {
            Verdict::MostlyFunctional
        } else if rate >= BASIC_FUNCTIONALITY_RATE {
            Verdict::BasicFunctionality
        } else {
            Verdict::ManyFailures
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            Verdict::AllPassed => "ALL TESTS PASSED! The CRM is working perfectly.",
            Verdict::MostlyFunctional => "Most tests passed. The CRM is mostly functional.",
            Verdict::BasicFunctionality => "Some tests passed. The CRM has basic functionality.",
            Verdict::ManyFailures => "Many tests failed. Please check the CRM setup.",
        }
    }
}

/// When a suite run counts as a success.
///
/// The two thresholds come from different suites and stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Every scenario fully passed
    Strict,
    /// Weighted pass rate at or above [`LENIENT_FLOOR`]
    Lenient,
}

impl ExitPolicy {
    pub fn is_met(self, summary: &Summary) -> bool {
        match self {
            ExitPolicy::Strict => summary.total > 0 && summary.rate >= ALL_PASSED_RATE,
            ExitPolicy::Lenient => summary.rate >= LENIENT_FLOOR,
        }
    }

    pub fn exit_code(self, summary: &Summary) -> u8 {
        if self.is_met(summary) {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reports(outcomes: &[Outcome]) -> Vec<ScenarioReport> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| ScenarioReport::new(&format!("scenario_{}", i), *o))
            .collect()
    }

    #[test]
    fn test_weighted_rate() {
        let summary = aggregate(&reports(&[
            Outcome::Passed,
            Outcome::Partial,
            Outcome::Failed,
            Outcome::Passed,
        ]));
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.score, 2.5);
        assert_eq!(summary.rate, 62.5);
    }

    #[test]
    fn test_empty_run() {
        let summary = aggregate(&[]);
        assert_eq!(summary.rate, 0.0);
        assert!(!ExitPolicy::Strict.is_met(&summary));
        assert!(!ExitPolicy::Lenient.is_met(&summary));
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_rate(100.0), Verdict::AllPassed);
        assert_eq!(Verdict::from_rate(99.9), Verdict::MostlyFunctional);
        assert_eq!(Verdict::from_rate(80.0), Verdict::MostlyFunctional);
        assert_eq!(Verdict::from_rate(50.0), Verdict::BasicFunctionality);
        assert_eq!(Verdict::from_rate(49.9), Verdict::ManyFailures);
    }

    #[test]
    fn test_strict_policy() {
        let all = aggregate(&reports(&[Outcome::Passed; 6]));
        assert_eq!(ExitPolicy::Strict.exit_code(&all), 0);

        let one_partial = aggregate(&reports(&[
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Partial,
        ]));
        assert_eq!(ExitPolicy::Strict.exit_code(&one_partial), 1);
    }

    #[test]
    fn test_lenient_policy() {
        // 4.5 / 5 = 90 %
        let mostly = aggregate(&reports(&[
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Partial,
        ]));
        assert_eq!(ExitPolicy::Lenient.exit_code(&mostly), 0);
        assert_eq!(ExitPolicy::Strict.exit_code(&mostly), 1);

        // 4 / 5 = 80 % sits exactly on the floor
        let floor = aggregate(&reports(&[
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Failed,
        ]));
        assert_eq!(ExitPolicy::Lenient.exit_code(&floor), 0);

        // 3.5 / 5 = 70 %
        let below = aggregate(&reports(&[
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Passed,
            Outcome::Partial,
            Outcome::Failed,
        ]));
        assert_eq!(ExitPolicy::Lenient.exit_code(&below), 1);
    }
}
