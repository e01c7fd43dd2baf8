use std::error::Error;
use std::sync::Arc;

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::error_handlers::IgnoringErrorHandlerSafe;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use vocabbot::config::Config;
use vocabbot::database::connection::Connection;
use vocabbot::database::seed::reload_from_seed_file;
use vocabbot::schema::schema;
use vocabbot::session::SessionTracker;
use vocabbot::state::BotState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let config = Config::from_env()?;
    init_logging(config.log_level);

    let connection = Arc::new(Connection::connect(&config.database_url).await?);
    connection.prepare_schema().await?;
    reload_from_seed_file(connection.as_ref(), &config.seed_path).await?;

    let tracker = Arc::new(SessionTracker::new(connection.clone()));

    let bot = Bot::new(config.token.clone());
    tracing::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<BotState>::new(),
            connection,
            tracker
        ])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            tracing::info!("Listening for webhooks on {}", webhook.addr);
            let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(listener, Arc::new(IgnoringErrorHandlerSafe))
                .await
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}

/// JSON logs at `level`; `RUST_LOG` directives refine it per target.
fn init_logging(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_ansi(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install the tracing subscriber: {e}");
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to forward log records to tracing: {e}");
    }
}
