//! Media Handlers module for processing photo messages

use anyhow::Result;
use teloxide::types::ChatId;
use tracing::debug;

use super::events::PhotoInfo;
use super::responses;
use super::{deliver, Delivery, HandlerContext};

/// Report the largest photo variant back to the user
pub async fn handle_photo_message(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    photo: &PhotoInfo,
) -> Result<()> {
    debug!(
        chat_id = %chat_id.0,
        file_size = photo.file_size,
        width = photo.width,
        height = photo.height,
        "Received photo message"
    );

    let reply = responses::photo_info(ctx.localization, ctx.language_code, photo);
    deliver(ctx, chat_id, Delivery::NewMessage, reply).await?;
    Ok(())
}
