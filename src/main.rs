use std::sync::Arc;

use clap::Parser;
use trainyard::ai::{HttpSuggester, NullSuggester};
use trainyard::db::Db;
use trainyard::notes::NoteSuggester;
use trainyard::AppState;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// libSQL server address, or `file:path.db` for a local database.
    #[clap(env)]
    url: String,

    /// libSQL authentication token.
    #[clap(env, default_value = "")]
    auth_token: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// Bootstrap admin account email.
    #[arg(long, env)]
    admin_email: Option<String>,

    /// Bootstrap admin account password.
    #[arg(long, env)]
    admin_password: Option<String>,

    /// Endpoint for AI note suggestions. Without it, drafts get none.
    #[arg(long, env)]
    suggest_endpoint: Option<String>,

    /// API key for the suggestion endpoint.
    #[arg(long, env)]
    suggest_api_key: Option<String>,

    /// Mark session cookies Secure (requires HTTPS).
    #[arg(long, env, default_value_t = false)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,trainyard=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(args.url, args.auth_token).await?;

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        db.ensure_admin(email, password).await?;
    }

    let suggester: Arc<dyn NoteSuggester> = match (args.suggest_endpoint, args.suggest_api_key) {
        (Some(endpoint), Some(api_key)) => Arc::new(HttpSuggester::new(endpoint, api_key)),
        _ => {
            tracing::info!("no suggestion endpoint configured, AI note drafting disabled");
            Arc::new(NullSuggester)
        }
    };

    let state = AppState::new(db, args.secure_cookies, suggester);
    let app = trainyard::router(state);

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!("listening on {}", args.address);
    axum::serve(listener, app).await?;

    Ok(())
}
