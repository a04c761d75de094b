use anyhow::Result;
use profile_bot::bot::events::localized_bot_commands;
use profile_bot::bot::{Command, InboundEvent, Router};
use profile_bot::config::AppConfig;
use profile_bot::errors::error_logging;
use profile_bot::localization::{self, LocalizationManager};
use profile_bot::observability;
use profile_bot::observability_config::ObservabilityConfig;
use profile_bot::profile_store::ProfileStore;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

/// Publish the command list (default English, plus French) to Telegram
async fn register_bot_commands(bot: &Bot, localization: &LocalizationManager) {
    if let Err(e) = bot
        .set_my_commands(localized_bot_commands(localization, None))
        .await
    {
        warn!(error = %e, "Failed to register bot commands");
    }

    if let Err(e) = bot
        .set_my_commands(localized_bot_commands(localization, Some("fr")))
        .language_code("fr")
        .await
    {
        warn!(error = %e, language = "fr", "Failed to register bot commands");
    }
}

async fn command_endpoint(router: Arc<Router>, msg: Message, command: Command) -> ResponseResult<()> {
    if let Some(event) = InboundEvent::from_command(&msg, command) {
        router.dispatch(event).await;
    }
    Ok(())
}

async fn message_endpoint(router: Arc<Router>, msg: Message) -> ResponseResult<()> {
    match InboundEvent::from_message(&msg) {
        Some(event) => router.dispatch(event).await,
        None => debug!(chat_id = %msg.chat.id, "Ignoring unsupported message"),
    }
    Ok(())
}

async fn callback_endpoint(bot: Bot, router: Arc<Router>, q: CallbackQuery) -> ResponseResult<()> {
    // Answer first so the client stops showing the loading indicator
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    if let Some(event) = InboundEvent::from_callback_query(&q) {
        router.dispatch(event).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let observability_config = ObservabilityConfig::from_env();
    observability_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;
    observability::init_tracing_with_config(&observability_config)?;

    let config = match AppConfig::from_env().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            error_logging::log_config_error(&e, "environment", "load_config");
            return Err(e.into());
        }
    };
    info!("{}", config.summary());

    observability::init_metrics_exporter(&config.observability, config.storage.data_file.clone())
        .await?;

    let store = Arc::new(ProfileStore::open(config.storage.data_file.clone()));
    let localization = localization::create_localization_manager()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.bot.http_timeout_secs))
        .build()?;
    let bot = Bot::with_client(config.bot.token.clone(), client);

    register_bot_commands(&bot, &localization).await;

    let router = Arc::new(Router::new(
        Arc::new(bot.clone()),
        store,
        localization,
        config.bot.admin_user_id,
    ));

    info!(
        http_timeout_secs = config.bot.http_timeout_secs,
        "Bot initialized, starting dispatcher"
    );

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(command_endpoint))
                .branch(dptree::endpoint(message_endpoint)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_endpoint));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            debug!(update = ?upd, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
