//! Outbound transport seam
//!
//! Handlers only ever talk to an [`Outbox`]; production wires in the teloxide
//! `Bot`, tests wire in a recorder.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId};

use crate::errors::AppResult;

#[async_trait]
pub trait Outbox: Send + Sync {
    /// Send a new text message, optionally with an inline keyboard
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()>;

    /// Replace the text (and keyboard) of an existing message
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()>;
}

#[async_trait]
impl Outbox for Bot {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()> {
        let request = self.send_message(chat_id, text);
        match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()> {
        let request = self.edit_message_text(chat_id, message_id, text);
        match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(())
    }
}
