use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use replay_runner::driver::webdriver::{SessionConfig, SessionMode, DEFAULT_LOCAL_ENDPOINT};
use replay_runner::{runner, ReplayConfig};

#[derive(Parser)]
#[command(name = "replay-runner")]
#[command(version = "0.1.0")]
#[command(about = "Replay recorded browser sessions against a live WebDriver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recording file
    Run {
        /// Path to the recording JSON file
        recording: PathBuf,

        /// Session mode (local, remote)
        #[arg(short, long, default_value = "local")]
        mode: String,

        /// Run the browser headless (local mode)
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Start URL used when the recording has no initial navigate
        #[arg(long)]
        start_url: Option<String>,

        /// Local WebDriver endpoint
        #[arg(long, default_value = DEFAULT_LOCAL_ENDPOINT)]
        webdriver_url: String,

        /// Remote grid endpoint (remote mode)
        #[arg(long)]
        remote_url: Option<String>,

        /// Browser name for remote sessions (chrome, firefox, edge)
        #[arg(long)]
        browser: Option<String>,

        /// Browser version for remote sessions
        #[arg(long)]
        browser_version: Option<String>,

        /// Delay between keystrokes in ms (0 types instantly)
        #[arg(long, default_value = "0")]
        typing_delay: u64,

        /// Output directory for execution logs and screenshots
        #[arg(short, long, default_value = "out")]
        log_dir: PathBuf,

        /// Settle pause after each navigate, in ms
        #[arg(long, default_value = "3000")]
        navigate_settle_ms: u64,

        /// Settle pause after a blank-page recovery, in ms
        #[arg(long, default_value = "800")]
        recovery_settle_ms: u64,

        /// Upper bound for the page-readiness wait, in ms
        #[arg(long, default_value = "20000")]
        ready_timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            recording,
            mode,
            headless,
            start_url,
            webdriver_url,
            remote_url,
            browser,
            browser_version,
            typing_delay,
            log_dir,
            navigate_settle_ms,
            recovery_settle_ms,
            ready_timeout_ms,
        } => {
            let mode = match mode.as_str() {
                "local" => SessionMode::Local,
                "remote" => SessionMode::Remote,
                _ => anyhow::bail!("Unknown mode: {} (expected local or remote)", mode),
            };

            println!(
                "{} Replaying recording: {}",
                "▶".green().bold(),
                recording.display()
            );
            println!(
                "  Mode: {}",
                match mode {
                    SessionMode::Local => "local".cyan(),
                    SessionMode::Remote => "remote".cyan(),
                }
            );
            if headless {
                println!("  Headless: {}", "Enabled".yellow());
            }
            if let Some(ref url) = start_url {
                println!("  Start URL: {}", url.cyan());
            }
            if let Some(ref url) = remote_url {
                println!("  Remote: {}", url.cyan());
            }
            println!("  Output: {}", log_dir.display().to_string().cyan());

            let config = ReplayConfig {
                default_url: start_url,
                typing_delay_ms: typing_delay,
                log_dir,
                ready_timeout_ms,
                navigate_settle_ms,
                recovery_settle_ms,
                ..ReplayConfig::default()
            };

            let session_config = SessionConfig {
                mode,
                headless,
                webdriver_url,
                remote_url,
                browser,
                browser_version,
            };

            runner::run_recording(&recording, config, session_config).await?;
        }
    }

    Ok(())
}
