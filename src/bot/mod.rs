//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `events`: transport-independent inbound events built from teloxide updates
//! - `outbox`: outbound transport seam, implemented for `teloxide::Bot`
//! - `router`: maps each event to exactly one handler behind an error boundary
//! - `command_handlers`, `message_handler`, `media_handlers`, `callback_handler`: handlers
//! - `responses`, `ui_builder`: reply texts and inline keyboards
//! - `broadcast`: admin fan-out to every known user

pub mod broadcast;
pub mod callback_handler;
pub mod command_handlers;
pub mod events;
pub mod media_handlers;
pub mod message_handler;
pub mod outbox;
pub mod responses;
pub mod router;
pub mod ui_builder;

use teloxide::types::{ChatId, MessageId};
use tracing::warn;

use crate::errors::{error_logging, AppResult};
use crate::localization::LocalizationManager;
use crate::profile_store::ProfileStore;

use self::responses::Reply;

// Re-export the pieces main.rs and the tests wire together
pub use broadcast::BroadcastCoordinator;
pub use events::{CallbackTag, Command, InboundEvent, PhotoInfo, Sender};
pub use outbox::Outbox;
pub use router::Router;

/// Common context for bot handlers containing shared dependencies
pub struct HandlerContext<'a> {
    pub outbox: &'a dyn Outbox,
    pub store: &'a ProfileStore,
    pub localization: &'a LocalizationManager,
    pub language_code: Option<&'a str>,
}

/// How a handler's reply reaches the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Send a fresh message (command path)
    NewMessage,
    /// Replace the text of the message carrying the pressed button (callback path)
    EditInPlace(MessageId),
}

impl Delivery {
    /// Edit the button's message when it is known, otherwise send a new one
    pub fn for_callback(message_id: Option<MessageId>) -> Self {
        match message_id {
            Some(id) => Delivery::EditInPlace(id),
            None => Delivery::NewMessage,
        }
    }
}

/// Deliver a reply with the requested strategy.
///
/// A failed edit falls back to sending a new message.
pub async fn deliver(
    ctx: &HandlerContext<'_>,
    chat_id: ChatId,
    delivery: Delivery,
    reply: Reply,
) -> AppResult<()> {
    match delivery {
        Delivery::NewMessage => {
            ctx.outbox
                .send_text(chat_id, reply.text, reply.keyboard)
                .await
        }
        Delivery::EditInPlace(message_id) => {
            match ctx
                .outbox
                .edit_text(chat_id, message_id, reply.text.clone(), reply.keyboard.clone())
                .await
            {
                Ok(()) => Ok(()),
                Err(e) => {
                    error_logging::log_delivery_error(&e, "edit_message_text", &chat_id.0.to_string());
                    warn!(chat_id = %chat_id.0, "Edit failed, sending reply as a new message");
                    ctx.outbox
                        .send_text(chat_id, reply.text, reply.keyboard)
                        .await
                }
            }
        }
    }
}
