use anyhow::Result;
use clap::Parser;
use person_detect::{
    config::{TelegramConfig, DEFAULT_TELEGRAM_API_URL},
    web::serve,
    Config,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "person-detect")]
#[command(about = "Detects people in uploaded images and reports them to Telegram")]
struct Args {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Shared secret expected in the `api-key` header
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_bot_token: Option<String>,

    /// Chat that receives every result
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    telegram_api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting person detection service...");
    tracing::info!("Bind address: {}", args.bind);

    let telegram = TelegramConfig::new(
        args.telegram_bot_token,
        args.telegram_chat_id,
        args.telegram_api_url,
    );
    let config = Config::new(&args.bind, args.api_key, telegram)?;

    serve(config).await?;

    Ok(())
}
