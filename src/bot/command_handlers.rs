//! Command Handlers module for processing bot commands
//!
//! `/help`, `/menu` and `/stats` are shared with the inline buttons; the
//! [`Delivery`] argument decides whether the reply is a new message or an
//! edit of the message holding the button.

use anyhow::Result;
use teloxide::types::ChatId;
use tracing::debug;

use crate::errors::AppError;

use super::broadcast::BroadcastCoordinator;
use super::events::Sender;
use super::responses;
use super::{deliver, Delivery, HandlerContext};

/// Handle the /start command
pub async fn handle_start_command(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    sender: &Sender,
) -> Result<()> {
    let created = ctx.store.ensure_user(
        &sender.profile_key(),
        &sender.first_name,
        sender.username.as_deref(),
    );
    debug!(user_id = %sender.id, created, "Handling /start command");

    let reply = responses::welcome(ctx.localization, ctx.language_code, &sender.first_name);
    deliver(ctx, chat_id, Delivery::NewMessage, reply).await?;
    Ok(())
}

/// Handle the /help command and the `help` button
pub async fn handle_help_command(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    delivery: Delivery,
) -> Result<()> {
    let reply = responses::help(ctx.localization, ctx.language_code);
    deliver(ctx, chat_id, delivery, reply).await?;
    Ok(())
}

/// Handle the /menu command and the `menu` button
pub async fn handle_menu_command(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    delivery: Delivery,
) -> Result<()> {
    let reply = responses::menu(ctx.localization, ctx.language_code);
    deliver(ctx, chat_id, delivery, reply).await?;
    Ok(())
}

/// Handle the /stats command and the `stats` button
pub async fn handle_stats_command(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    user_id: u64,
    delivery: Delivery,
) -> Result<()> {
    let key = user_id.to_string();
    let profile = ctx.store.get(&key);
    debug!(user_id = %user_id, has_profile = profile.is_some(), "Handling stats request");

    let reply = responses::stats(
        ctx.localization,
        ctx.language_code,
        &key,
        profile.as_ref(),
        ctx.store.len(),
    );
    deliver(ctx, chat_id, delivery, reply).await?;
    Ok(())
}

/// Handle the /broadcast command
pub async fn handle_broadcast_command(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    user_id: u64,
    message: &str,
    coordinator: &BroadcastCoordinator,
) -> Result<()> {
    let table = ctx.store.snapshot();
    let outcome = coordinator
        .broadcast(ctx.outbox, &table, user_id, message, |text| {
            responses::broadcast_payload(ctx.localization, ctx.language_code, text)
        })
        .await;

    let reply = match outcome {
        Ok(sent) => responses::broadcast_sent(ctx.localization, ctx.language_code, sent),
        Err(AppError::Unauthorized(reason)) => {
            debug!(user_id = %user_id, reason = %reason, "Rejected broadcast");
            responses::broadcast_denied(ctx.localization, ctx.language_code)
        }
        Err(AppError::Usage(_)) => responses::broadcast_usage(ctx.localization, ctx.language_code),
        Err(e) => return Err(e.into()),
    };

    deliver(ctx, chat_id, Delivery::NewMessage, reply).await?;
    Ok(())
}
