//! Message Handler module for processing free-text messages

use anyhow::Result;
use chrono::Local;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use teloxide::types::ChatId;
use tracing::debug;

use super::events::Sender;
use super::responses;
use super::{deliver, Delivery, HandlerContext};

/// Count the message for initialized users, then answer with a smart reply
pub async fn handle_text_message(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    sender: &Sender,
    text: &str,
    rng: &Mutex<StdRng>,
) -> Result<()> {
    let count = ctx.store.increment_message_count(&sender.profile_key());
    debug!(user_id = %sender.id, message_count = ?count, "Received text message");

    let reply = {
        let mut rng = rng.lock();
        responses::smart_reply(
            ctx.localization,
            ctx.language_code,
            text,
            &sender.first_name,
            Local::now().naive_local(),
            &mut *rng,
        )
    };

    deliver(ctx, chat_id, Delivery::NewMessage, reply).await?;
    Ok(())
}
