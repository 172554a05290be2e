// # consolectl - DNS console CLI
//
// Thin command-line front end for the console. All session, collection, and
// editing logic lives in console-core; this binary only parses arguments,
// wires the HTTP client and the file token store together, and renders
// results.
//
// ## Configuration
//
// - `--api-url` / `DNS_CONSOLE_API_URL`: service base URL
// - `--token-file` / `DNS_CONSOLE_TOKEN_FILE`: durable token path
//   (default: $HOME/.config/dns-console/token)
// - `--log-level` / `DNS_CONSOLE_LOG_LEVEL`: trace|debug|info|warn|error
//
// ## Example
//
// ```bash
// export DNS_CONSOLE_API_URL=https://dns.example.org
//
// consolectl login alice
// consolectl list
// consolectl set myhost ipv4 203.0.113.7
// consolectl delete myhost
// consolectl logout
// ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use console_api_http::HttpConsoleApi;
use console_core::{
    ConsoleApi, ConsoleConfig, DomainCollection, FieldEditor, FileTokenStore, RecordField,
    Selection, SessionStatus, SessionStore,
};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum CliExitCode {
    /// Command completed
    Success = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// The requested operation failed
    OperationError = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "consolectl", about = "Manage domains on a DNS console service")]
struct Cli {
    /// Base URL of the console service
    #[arg(long, env = "DNS_CONSOLE_API_URL")]
    api_url: String,

    /// Path of the durable token file
    #[arg(long, env = "DNS_CONSOLE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DNS_CONSOLE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session token
    Login {
        username: String,
        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and persist the session token
    CreateAccount {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Terminate the session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// Show service information
    Info,
    /// List owned domains
    List,
    /// Show one domain, or the overview when the name is omitted or unknown
    Show { name: Option<String> },
    /// Update one address field of a domain
    Set {
        name: String,
        /// Which field to update (ipv4 or ipv6)
        field: RecordField,
        value: String,
    },
    /// Delete a domain
    Delete { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let token_path = match cli.token_file.clone().or_else(default_token_path) {
        Some(path) => path,
        None => {
            eprintln!("error: cannot determine a token path; pass --token-file");
            return CliExitCode::ConfigError.into();
        }
    };

    let mut config = ConsoleConfig::new(cli.api_url.clone(), token_path);
    config.log_level = cli.log_level.clone();
    if let Err(e) = config.validate() {
        eprintln!("configuration error: {}", e);
        return CliExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        _ => Level::ERROR,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
        return CliExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return CliExitCode::OperationError.into();
        }
    };

    match rt.block_on(run(cli, config)) {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            CliExitCode::OperationError.into()
        }
    }
}

/// Default token location under the user's config directory
fn default_token_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("dns-console")
            .join("token")
    })
}

async fn run(cli: Cli, config: ConsoleConfig) -> Result<()> {
    let api = HttpConsoleApi::with_timeout(
        &config.api_url,
        Duration::from_secs(config.timeout_secs),
    )?;
    let session = SessionStore::new(Arc::new(FileTokenStore::new(&config.token_path)));
    let domains = DomainCollection::new();
    let editor = FieldEditor::new();

    session.initialize().await?;

    match cli.command {
        Command::Login { username, password } => {
            let password = read_password(password)?;
            session.login(&api, &username, &password).await?;
            match session.revalidate_user(&api).await {
                SessionStatus::Authenticated => {
                    let user = session.user().await.context("identity missing")?;
                    println!("logged in as {}", user.username);
                    Ok(())
                }
                _ => bail!("login succeeded but the identity could not be confirmed"),
            }
        }
        Command::CreateAccount { username, password } => {
            let password = read_password(password)?;
            session.create_account(&api, &username, &password).await?;
            session.revalidate_user(&api).await;
            println!("account created: {}", username);
            Ok(())
        }
        Command::Logout => {
            session.logout(&api).await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            match session.revalidate_user(&api).await {
                SessionStatus::Authenticated => {
                    let user = session.user().await.context("identity missing")?;
                    println!("{} (created {})", user.username, user.created);
                }
                _ => println!("not logged in"),
            }
            Ok(())
        }
        Command::Info => {
            let info = api.service_info().await?;
            println!("zone: {}", info.zone_display());
            Ok(())
        }
        Command::List => {
            require_auth(&session, &api).await?;
            domains.load(&api, &session).await?;
            print_overview(&api, &domains).await;
            Ok(())
        }
        Command::Show { name } => {
            require_auth(&session, &api).await?;
            domains.load(&api, &session).await?;
            match console_core::resolve(name.as_deref(), &domains).await {
                Selection::Edit(domain) => {
                    let zone = zone_suffix(&api).await;
                    println!("{}{}", domain.name, zone);
                    println!("  ipv4: {}", domain.ipv4.as_deref().unwrap_or("-"));
                    println!("  ipv6: {}", domain.ipv6.as_deref().unwrap_or("-"));
                }
                Selection::Overview => print_overview(&api, &domains).await,
            }
            Ok(())
        }
        Command::Set { name, field, value } => {
            require_auth(&session, &api).await?;
            domains.load(&api, &session).await?;
            if let Err(e) = editor.update(&api, &session, &domains, &name, field, &value).await {
                match editor.field_error(&name, field).await {
                    Some(err) => bail!("update of {} {} failed: {}", name, field, err),
                    None => return Err(e.into()),
                }
            }
            println!("{} {} = {}", name, field, value);
            Ok(())
        }
        Command::Delete { name } => {
            require_auth(&session, &api).await?;
            editor.delete(&api, &session, &domains, &name).await?;
            println!("deleted {}", name);
            Ok(())
        }
    }
}

/// Confirm the persisted session, failing with a login hint otherwise
async fn require_auth(session: &SessionStore, api: &HttpConsoleApi) -> Result<()> {
    match session.revalidate_user(api).await {
        SessionStatus::Authenticated => Ok(()),
        _ => bail!("not logged in (run `consolectl login <username>`)"),
    }
}

/// Render the overview: every domain with its zone suffix and addresses
async fn print_overview(api: &HttpConsoleApi, domains: &DomainCollection) {
    let zone = zone_suffix(api).await;
    let all = domains.all().await;
    if all.is_empty() {
        println!("no domains");
        return;
    }
    for domain in all {
        let addrs: Vec<&str> = [domain.ipv4.as_deref(), domain.ipv6.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        println!("{}{}  {}", domain.name, zone, addrs.join(", "));
    }
}

/// Zone suffix for display, empty when the info endpoint is unavailable
async fn zone_suffix(api: &HttpConsoleApi) -> String {
    match api.service_info().await {
        Ok(info) => format!(".{}", info.zone_display()),
        Err(_) => String::new(),
    }
}

fn read_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(password)
}
