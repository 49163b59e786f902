use clap::Parser;
use std::io::{self, IsTerminal};

use proxyvault_infrastructure::config::{default_config_path, default_log_dir};
use proxyvault_lib::application::services::{AppConfig, ConfigService};
use proxyvault_lib::presentation::cli::{execute, Cli};
use proxyvault_lib::presentation::error::CommandError;
use proxyvault_lib::presentation::prompt::Prompter;
use proxyvault_lib::presentation::state::AppState;

fn main() {
    let cli = Cli::parse();

    let config_service = ConfigService::load(default_config_path());
    let mut config = config_service.config().clone();
    cli.apply_overrides(&mut config);

    let log_dir = default_log_dir();
    match proxyvault_infrastructure::logging::init_logger(log_dir.clone(), config.log_level.as_str())
    {
        Ok(_) => {
            tracing::info!("🚀 proxyvault starting...");
            tracing::debug!("📝 File logging initialized at: {}", log_dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(config.log_level.as_str())
                    }),
                )
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(true)
                .with_line_number(true)
                .try_init();
        }
    }
    config_service.report();

    if let Err(e) = run(cli, config) {
        tracing::error!(code = e.code, "{}", e.message);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<(), CommandError> {
    let state = AppState::new(config)?;

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout().lock());
    if io::stdin().is_terminal() {
        prompter = prompter.with_hidden_input(rpassword::read_password);
    }

    execute(&state, cli.command, prompter)
}
