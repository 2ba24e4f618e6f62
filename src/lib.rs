pub mod dispatch;
pub mod driver;
pub mod error;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod session;
pub mod utils;

// Re-export common items
pub use error::{HarnessError, HarnessResult};
pub use report::{generate_report, write_reports};
pub use runner::{run_suite, Suite, SuiteRun};
pub use utils::config::HarnessConfig;
