use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crm_tester::runner::console;
use crm_tester::{report, runner, HarnessConfig, Suite};

#[derive(Parser)]
#[command(name = "crm-tester")]
#[command(version = "0.1.0")]
#[command(about = "Black-box test harness for Frappe CRM", long_about = None)]
struct Cli {
    /// Base URL of the CRM under test [env: CRM_BASE_URL]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Login user [env: CRM_USERNAME]
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Login password [env: CRM_PASSWORD]
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Per-request timeout in seconds [env: CRM_TIMEOUT_SECS]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Write crm-results.json and junit.xml into this directory
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the comprehensive feature suite over the HTTP API
    Features,

    /// Run the quick smoke suite over the HTTP API
    Smoke,

    /// Run the browser suite against the web interface
    Ui {
        /// Show the browser window
        #[arg(long, default_value = "false")]
        headed: bool,
    },

    /// Generate report from saved results
    Report {
        /// Path to crm-results.json
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Explicit flags win over whatever `config` was loaded with
    fn apply_to(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(ref base_url) = self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ref username) = self.username {
            config.username = username.clone();
        }
        if let Some(ref password) = self.password {
            config.password = password.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config.report_dir = self.report.clone();
        if let Commands::Ui { headed: true } = self.command {
            config.headless = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = cli.apply_to(HarnessConfig::default());

    let suite = match cli.command {
        Commands::Features => Suite::Features,
        Commands::Smoke => Suite::Smoke,
        Commands::Ui { .. } => Suite::Ui,
        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    log::debug!("running {} against {}", suite.name(), config.base_url);

    match runner::run_suite(suite, &config).await {
        Ok(run) => {
            if let Some(ref dir) = config.report_dir {
                report::write_reports(&run, dir)
                    .with_context(|| format!("Failed to export reports to {}", dir.display()))?;
            }
            Ok(ExitCode::from(run.exit_code()))
        }
        Err(err) => {
            console::aborted(&err);
            Ok(ExitCode::from(1))
        }
    }
}
