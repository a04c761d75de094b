//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::types::{ChatId, MessageId};
use tracing::debug;

use super::command_handlers::{handle_help_command, handle_menu_command, handle_stats_command};
use super::events::{CallbackTag, Sender};
use super::responses;
use super::{deliver, Delivery, HandlerContext};

/// Route a button press by its tag. Unknown tags are ignored.
pub async fn handle_callback(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    sender: &Sender,
    data: &str,
) -> Result<()> {
    let Some(tag) = CallbackTag::parse(data) else {
        debug!(user_id = %sender.id, data = %data, "Ignoring unknown callback tag");
        return Ok(());
    };

    let delivery = Delivery::for_callback(message_id);
    debug!(user_id = %sender.id, tag = tag.as_str(), ?delivery, "Handling callback");

    match tag {
        CallbackTag::Menu => handle_menu_command(ctx, chat_id, delivery).await,
        CallbackTag::Stats => handle_stats_command(ctx, chat_id, sender.id, delivery).await,
        CallbackTag::Help => handle_help_command(ctx, chat_id, delivery).await,
        CallbackTag::Notify => {
            let reply = responses::notify_ack(ctx.localization, ctx.language_code);
            deliver(ctx, chat_id, delivery, reply).await?;
            Ok(())
        }
        CallbackTag::Feedback => {
            let reply = responses::feedback_prompt(ctx.localization, ctx.language_code);
            deliver(ctx, chat_id, delivery, reply).await?;
            Ok(())
        }
    }
}
