use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::application::dtos::{ProxyConfigDto, UpdateProxyConfigInput};
use crate::application::services::{AppConfig, LogLevel, RestoreOutcome};
use crate::presentation::error::CommandError;
use crate::presentation::prompt::{FormOutcome, Prompter};
use crate::presentation::state::AppState;
use proxyvault_domain::shared::{DomainError, ErrorCode};
use proxyvault_infrastructure::security::CipherScheme;

const DEFAULT_CHECK_URL: &str = "http://example.com/";

#[derive(Debug, Parser)]
#[command(
    name = "proxyvault",
    version,
    about = "Store, edit and re-apply the network proxy settings"
)]
pub struct Cli {
    /// Proxy settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Cipher used when writing the password (authenticated or legacy)
    #[arg(long, global = true, value_name = "SCHEME")]
    pub cipher: Option<CipherScheme>,

    /// error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Command-line flags win over file and environment settings
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(cipher) = self.cipher {
            config.cipher = cipher;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the stored settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the stored settings interactively, then apply and save them
    Edit,
    /// Replace the stored settings without prompting
    Set(SetArgs),
    /// Send one request through the stored proxy and report the answer
    Check {
        #[arg(long, default_value = DEFAULT_CHECK_URL)]
        url: String,
    },
    /// Print the location of the settings file
    Path,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub host: String,

    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    #[arg(long, conflicts_with = "no_auth")]
    pub username: Option<String>,

    #[arg(
        long,
        conflicts_with = "no_auth",
        env = "PROXYVAULT_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// The proxy does not ask for credentials
    #[arg(long)]
    pub no_auth: bool,

    /// Store the settings but leave the proxy switched off
    #[arg(long)]
    pub disabled: bool,
}

impl From<SetArgs> for UpdateProxyConfigInput {
    fn from(args: SetArgs) -> Self {
        Self {
            enabled: !args.disabled,
            host: args.host,
            port: args.port,
            requires_authentication: !args.no_auth,
            username: args.username,
            password: args.password,
        }
    }
}

/// Run one command against `state`, prompting through `prompter`
pub fn execute<R: BufRead, W: Write>(
    state: &AppState,
    command: Command,
    mut prompter: Prompter<R, W>,
) -> Result<(), CommandError> {
    match command {
        Command::Show { json } => show(state, json, prompter.output()),
        Command::Edit => edit(state, prompter),
        Command::Set(args) => {
            let outcome = state.proxy_config.update(args.into())?;
            writeln!(prompter.output(), "✓ Proxy settings applied")?;
            report_store_error(prompter.output(), outcome.store_error.as_ref())
        }
        Command::Check { url } => check(state, &url, prompter.output()),
        Command::Path => {
            writeln!(prompter.output(), "{}", state.store_path().display())?;
            Ok(())
        }
    }
}

/// Apply the stored settings, then fetch `url` with a client routed through them
fn check<W: Write>(state: &AppState, url: &str, output: &mut W) -> Result<(), CommandError> {
    match state.proxy_config.restore_last_stored()? {
        RestoreOutcome::Applied(dto) => {
            writeln!(output, "Using proxy http://{}:{}", dto.host, dto.port)?
        }
        RestoreOutcome::Disabled => {
            writeln!(output, "Stored proxy is disabled, connecting directly")?
        }
        RestoreOutcome::NothingStored => {
            writeln!(output, "No proxy settings stored yet, connecting directly")?
        }
    }

    let network_error =
        |e: reqwest::Error| CommandError::from_code(ErrorCode::NetworkError, e.to_string());
    let client = state.applier.client_builder().build().map_err(network_error)?;

    let started = Instant::now();
    let response = client.get(url).send().map_err(network_error)?;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    info!(url, status = status.as_u16(), elapsed_ms, "Proxy check finished");

    if status.is_success() || status.is_redirection() {
        writeln!(output, "✓ {} answered {} in {} ms", url, status, elapsed_ms)?;
        Ok(())
    } else {
        Err(CommandError::from_code(
            ErrorCode::NetworkError,
            format!("{} answered {}", url, status),
        ))
    }
}

fn show<W: Write>(state: &AppState, json: bool, output: &mut W) -> Result<(), CommandError> {
    let stored = state.proxy_config.get()?;

    if json {
        writeln!(output, "{}", serde_json::to_string_pretty(&stored)?)?;
        return Ok(());
    }

    match stored {
        Some(dto) => print_settings(output, &dto)?,
        None => writeln!(output, "No proxy settings stored yet")?,
    }
    Ok(())
}

fn print_settings<W: Write>(output: &mut W, dto: &ProxyConfigDto) -> std::io::Result<()> {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    writeln!(output, "Enabled:        {}", yes_no(dto.enabled))?;
    writeln!(output, "Host:           {}", dto.host)?;
    writeln!(output, "Port:           {}", dto.port)?;
    writeln!(
        output,
        "Authentication: {}",
        yes_no(dto.requires_authentication)
    )?;
    if dto.requires_authentication {
        writeln!(
            output,
            "Username:       {}",
            dto.username.as_deref().unwrap_or("")
        )?;
        writeln!(
            output,
            "Password:       {}",
            if dto.has_password { "(stored)" } else { "" }
        )?;
    }
    Ok(())
}

fn edit<R: BufRead, W: Write>(
    state: &AppState,
    mut prompter: Prompter<R, W>,
) -> Result<(), CommandError> {
    let factory = state.editor_resolver.resolve()?;
    let mut session = state.new_session();

    let report = session.open(factory.as_ref())?;
    if let Some(e) = &report.load_error {
        writeln!(
            prompter.output(),
            "⚠️  Stored settings could not be read ({}). Starting from defaults.",
            e.format_with_code()
        )?;
    }

    loop {
        let editor = session
            .editor_mut()
            .ok_or_else(|| DomainError::InvalidState("Session has no editor".to_string()))?;

        if prompter.edit(editor)? == FormOutcome::Cancel {
            session.cancel()?;
            writeln!(prompter.output(), "Cancelled, nothing changed")?;
            return Ok(());
        }

        match session.confirm() {
            Ok(report) => {
                writeln!(prompter.output(), "✓ Proxy settings applied")?;
                return report_store_error(prompter.output(), report.store_error.as_ref());
            }
            // Same as the dialog staying open: show the problem and ask again
            Err(e @ (DomainError::Validation(_) | DomainError::ApplyFailure(_))) => {
                writeln!(prompter.output(), "{}", CommandError::from(e))?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn report_store_error<W: Write>(
    output: &mut W,
    store_error: Option<&DomainError>,
) -> Result<(), CommandError> {
    if let Some(e) = store_error {
        warn!(error = %e, "Settings are in effect but were not saved");
        writeln!(
            output,
            "⚠️  Settings are in effect but were not saved: {}",
            e.format_with_code()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> AppState {
        AppState::new(AppConfig {
            store_path: Some(dir.path().join("proxy.properties")),
            ..AppConfig::default()
        })
        .unwrap()
    }

    fn run(state: &AppState, args: &[&str], input: &str) -> Result<String, CommandError> {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut output = Vec::new();
        let prompter = Prompter::new(Cursor::new(input.to_string()), &mut output);
        execute(state, cli.command, prompter)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "proxyvault",
            "show",
            "--store",
            "/tmp/p.properties",
            "--cipher",
            "legacy",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/p.properties")));
        assert_eq!(config.cipher, CipherScheme::Legacy);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_set_rejects_port_zero_and_conflicting_flags() {
        assert!(Cli::try_parse_from(["proxyvault", "set", "--host", "h", "--port", "0"]).is_err());
        assert!(Cli::try_parse_from([
            "proxyvault",
            "set",
            "--host",
            "h",
            "--port",
            "80",
            "--no-auth",
            "--username",
            "u",
        ])
        .is_err());
    }

    #[test]
    fn test_show_before_anything_is_stored() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let output = run(&state, &["proxyvault", "show"], "").unwrap();
        assert_eq!(output, "No proxy settings stored yet\n");

        let output = run(&state, &["proxyvault", "show", "--json"], "").unwrap();
        assert_eq!(output.trim(), "null");
    }

    #[test]
    fn test_set_then_show() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        run(
            &state,
            &[
                "proxyvault", "set", "--host", "proxy.corp", "--port", "3128", "--username",
                "alice", "--password", "s3cret",
            ],
            "",
        )
        .unwrap();
        assert!(state.proxy_config.is_proxy_set());

        let output = run(&state, &["proxyvault", "show", "--json"], "").unwrap();
        let dto: ProxyConfigDto = serde_json::from_str(&output).unwrap();
        assert_eq!(dto.host, "proxy.corp");
        assert!(dto.has_password);
        assert!(!output.contains("s3cret"));

        let output = run(&state, &["proxyvault", "show"], "").unwrap();
        assert!(output.contains("Password:       (stored)"));
    }

    #[test]
    fn test_set_with_missing_credentials_fails_validation() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let err = run(
            &state,
            &["proxyvault", "set", "--host", "proxy.corp", "--port", "3128"],
            "",
        )
        .unwrap_err();

        assert_eq!(err.code, 6001);
        assert!(!state.store_path().exists());
    }

    #[test]
    fn test_edit_asks_again_after_invalid_settings() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        // First pass leaves the password empty, second pass supplies it
        let script = "y\nproxy.corp\n3128\ny\nalice\n\ny\n\n\n\n\n\ns3cret\ny\n";
        let output = run(&state, &["proxyvault", "edit"], script).unwrap();

        assert!(output.contains("[6001]"));
        assert!(output.contains("✓ Proxy settings applied"));

        let stored = state.proxy_config.get().unwrap().unwrap();
        assert_eq!(stored.username.as_deref(), Some("alice"));
        assert!(stored.has_password);
    }

    #[test]
    fn test_edit_cancel_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let output = run(&state, &["proxyvault", "edit"], "y\nproxy.corp\n").unwrap();

        assert!(output.contains("Cancelled"));
        assert!(!state.store_path().exists());
        assert!(!state.proxy_config.is_proxy_set());
    }

    #[test]
    fn test_edit_reports_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        std::fs::write(state.store_path(), "host=proxy.corp\n").unwrap();

        let output = run(&state, &["proxyvault", "edit"], "n\nn\n").unwrap();
        assert!(output.contains("[4003]"));
    }

    /// Answers one request with `status_line` and hands back the request head
    fn spawn_http_server(status_line: &'static str) -> (u16, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut byte = [0u8; 1];
            while !head.ends_with(b"\r\n\r\n") && stream.read(&mut byte).unwrap() == 1 {
                head.push(byte[0]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status_line
            );
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(String::from_utf8_lossy(&head).into_owned()).unwrap();
        });

        (port, rx)
    }

    #[test]
    fn test_check_without_settings_connects_directly() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let (port, requests) = spawn_http_server("200 OK");
        let url = format!("http://127.0.0.1:{}/ping", port);

        let output = run(&state, &["proxyvault", "check", "--url", &url], "").unwrap();

        assert!(output.starts_with("No proxy settings stored yet, connecting directly\n"));
        assert!(output.contains(&format!("✓ {} answered 200 OK", url)));
        assert!(requests.recv().unwrap().starts_with("GET /ping HTTP/1.1\r\n"));
    }

    #[test]
    fn test_check_goes_through_stored_proxy() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let (port, requests) = spawn_http_server("200 OK");

        run(
            &state,
            &[
                "proxyvault", "set", "--host", "127.0.0.1", "--port", &port.to_string(),
                "--no-auth",
            ],
            "",
        )
        .unwrap();

        let output = run(
            &state,
            &["proxyvault", "check", "--url", "http://example.invalid/ping"],
            "",
        )
        .unwrap();

        assert!(output.starts_with(&format!("Using proxy http://127.0.0.1:{}\n", port)));
        assert!(output.contains("answered 200 OK"));
        assert!(requests
            .recv()
            .unwrap()
            .starts_with("GET http://example.invalid/ping HTTP/1.1\r\n"));
    }

    #[test]
    fn test_check_reports_rejected_request() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        let (port, _requests) = spawn_http_server("407 Proxy Authentication Required");
        let url = format!("http://127.0.0.1:{}/", port);

        let err = run(&state, &["proxyvault", "check", "--url", &url], "").unwrap_err();

        assert_eq!(err.code, ErrorCode::NetworkError.code());
        assert!(err.message.contains("407"));
    }

    #[test]
    fn test_path_prints_store_location() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let output = run(&state, &["proxyvault", "path"], "").unwrap();
        assert_eq!(
            output.trim(),
            dir.path().join("proxy.properties").display().to_string()
        );
    }
}
