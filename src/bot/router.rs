//! Event router
//!
//! Maps every [`InboundEvent`] to exactly one handler. Handler errors stop at
//! [`Router::dispatch`]: they are logged together with the event and the
//! originating user is not notified.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Instrument;

use crate::errors::error_logging;
use crate::localization::LocalizationManager;
use crate::observability;
use crate::profile_store::ProfileStore;

use super::broadcast::BroadcastCoordinator;
use super::callback_handler::handle_callback;
use super::command_handlers::{
    handle_broadcast_command, handle_help_command, handle_menu_command, handle_start_command,
    handle_stats_command,
};
use super::events::{Command, InboundEvent};
use super::media_handlers::handle_photo_message;
use super::message_handler::handle_text_message;
use super::outbox::Outbox;
use super::{Delivery, HandlerContext};

pub struct Router {
    outbox: Arc<dyn Outbox>,
    store: Arc<ProfileStore>,
    localization: Arc<LocalizationManager>,
    broadcaster: BroadcastCoordinator,
    rng: Mutex<StdRng>,
}

impl Router {
    pub fn new(
        outbox: Arc<dyn Outbox>,
        store: Arc<ProfileStore>,
        localization: Arc<LocalizationManager>,
        admin_user_id: u64,
    ) -> Self {
        Self {
            outbox,
            store,
            localization,
            broadcaster: BroadcastCoordinator::new(admin_user_id),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Replace the randomness source used for filler replies
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    /// Run the handler for `event`, logging instead of propagating any failure
    pub async fn dispatch(&self, event: InboundEvent) {
        let kind = event.kind();
        let user_id = event.sender().id;
        let span = observability::telegram_span(kind, Some(user_id));
        let start_time = Instant::now();

        observability::record_telegram_event(kind);

        let result = self.route(&event).instrument(span).await;

        observability::record_request_metrics(kind, start_time.elapsed());

        if let Err(e) = result {
            observability::record_handler_failure(kind);
            error_logging::log_handler_error(&format!("{:#}", e), &event, Some(user_id));
        }
    }

    async fn route(&self, event: &InboundEvent) -> Result<()> {
        let sender = event.sender();
        let ctx = HandlerContext {
            outbox: self.outbox.as_ref(),
            store: self.store.as_ref(),
            localization: self.localization.as_ref(),
            language_code: sender.language_code.as_deref(),
        };

        match event {
            InboundEvent::Command {
                chat_id,
                sender,
                command,
            } => match command {
                Command::Start => handle_start_command(&ctx, *chat_id, sender).await,
                Command::Help => handle_help_command(&ctx, *chat_id, Delivery::NewMessage).await,
                Command::Menu => handle_menu_command(&ctx, *chat_id, Delivery::NewMessage).await,
                Command::Stats => {
                    handle_stats_command(&ctx, *chat_id, sender.id, Delivery::NewMessage).await
                }
                Command::Broadcast(message) => {
                    handle_broadcast_command(&ctx, *chat_id, sender.id, message, &self.broadcaster)
                        .await
                }
            },
            InboundEvent::Text {
                chat_id,
                sender,
                text,
            } => handle_text_message(&ctx, *chat_id, sender, text, &self.rng).await,
            InboundEvent::Photo { chat_id, photo, .. } => {
                handle_photo_message(&ctx, *chat_id, photo).await
            }
            InboundEvent::Callback {
                chat_id,
                message_id,
                sender,
                data,
            } => handle_callback(&ctx, *chat_id, *message_id, sender, data).await,
        }
    }
}
