use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use guichet::{CredentialHasher, Guichet, SqliteRepositoryProvider};
use guichet_axum::{AppState, create_router};
use guichet_core::services::Notifier;
use guichet_mailer::{FileTransport, MailNotifier, SmtpTransport, TlsConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::EnvFilter;

/// Command line interface for the guichet service
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://guichet.db")]
    db_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create tables and indexes, then exit
    Provision,
    /// Run the HTTP service
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    listen_addr: String,

    /// Public base URL used in emailed links
    #[arg(long, env = "APP_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// From address for outbound mail
    #[arg(long, env = "MAIL_FROM", default_value = "noreply@localhost")]
    mail_from: String,

    /// SMTP relay hostname; without one, messages land in --mail-dir
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT")]
    smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD")]
    smtp_password: Option<String>,

    /// Directory for the development file transport
    #[arg(long, env = "MAIL_DIR", default_value = "./outbox")]
    mail_dir: String,

    /// Seconds between token purge sweeps
    #[arg(long, env = "PURGE_INTERVAL_SECS", default_value_t = 900)]
    purge_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let options = SqliteConnectOptions::from_str(&cli.db_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let repositories = Arc::new(SqliteRepositoryProvider::new(pool));

    match cli.command {
        Commands::Provision => {
            Guichet::new(repositories).provision().await?;
            tracing::info!("schema provisioned");
        }
        Commands::Serve(args) => {
            serve(repositories, args).await?;
        }
    }

    Ok(())
}

async fn serve(
    repositories: Arc<SqliteRepositoryProvider>,
    args: ServeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = build_notifier(&args)?;
    let hasher = Arc::new(CredentialHasher::default());

    let guichet = Arc::new(Guichet::with_collaborators(
        repositories.clone(),
        hasher.clone(),
        notifier.clone(),
    ));
    guichet.provision().await?;

    spawn_purge_task(guichet.clone(), args.purge_interval_secs);

    let state = AppState::new(repositories, hasher, notifier);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;
    tracing::info!(addr = %args.listen_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_notifier(args: &ServeArgs) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    match &args.smtp_host {
        Some(host) => {
            let mut builder = SmtpTransport::builder(host).tls(TlsConfig::StartTls);
            if let Some(port) = args.smtp_port {
                builder = builder.port(port);
            }
            if let (Some(username), Some(password)) = (&args.smtp_username, &args.smtp_password) {
                builder = builder.credentials(username, password);
            }
            let transport = builder.build()?;
            tracing::info!(%host, "mail transport: smtp");
            Ok(Arc::new(MailNotifier::new(
                transport,
                args.mail_from.clone(),
                args.base_url.clone(),
            )))
        }
        None => {
            let transport = FileTransport::new(&args.mail_dir)?;
            tracing::info!(dir = %args.mail_dir, "mail transport: file");
            Ok(Arc::new(MailNotifier::new(
                transport,
                args.mail_from.clone(),
                args.base_url.clone(),
            )))
        }
    }
}

fn spawn_purge_task(guichet: Arc<Guichet<SqliteRepositoryProvider>>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // first tick fires immediately, which doubles as a startup sweep
        loop {
            interval.tick().await;
            match guichet.purge_expired_tokens().await {
                Ok(purged) if purged > 0 => tracing::info!(purged, "token sweep"),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "token sweep failed"),
            }
        }
    });
}
