// Badge Report - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/badge-report operator@example.com
// ```
//
// Or with a configuration file:
//
// ```console
// $ ./target/release/badge-report --config report.json operator@example.com
// ```

use badge_report::connector::TcpSession;
use badge_report::delivery::{DeliveryOutcome, SmtpMailer};
use badge_report::pipeline::{LoggingConfig, Pipeline};
use badge_report::types::{CliArgs, ReportConfig};
use clap::Parser;
use std::process;
use tracing::{error, info, Level};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        let default_config = ReportConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags; file logging mirrors the
    // operator-facing run log of the report job.
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().with_level(Level::WARN).with_file_logging("logs").init()
    };

    if let Err(e) = logging_result {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    // Load configuration from defaults, file, environment and CLI arguments
    let config = match ReportConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - the report pipeline will not be executed.");
        return;
    }

    let recipient = match &args.recipient {
        Some(recipient) => recipient.clone(),
        None => {
            error!("A recipient email address is required as the positional argument");
            process::exit(1);
        }
    };

    info!("Starting report run for {}", recipient);

    let mailer = SmtpMailer::new(
        config.smtp_host.clone(),
        config.smtp_port,
        config.smtp_username.clone(),
        config.smtp_password.clone(),
    );
    let mut session = TcpSession::new();
    let today = chrono::Local::now().date_naive();

    let outcome = match Pipeline::new(config).run(&mut session, &mailer, &recipient, today) {
        Ok(summary) => {
            info!(
                "Report delivered to {}: {} rows ({}..{}), {} records skipped",
                recipient,
                summary.rows_written,
                summary.window.start,
                summary.window.end,
                summary.records_skipped
            );
            DeliveryOutcome::delivered()
        }
        Err(e) => e.outcome(),
    };

    if let Some(reason) = &outcome.failure_reason {
        error!("Report not delivered: {}", reason);
        process::exit(1);
    }
}
