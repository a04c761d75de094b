//! Admin broadcast to every known user
//!
//! Delivery is sequential and best-effort: a failing recipient is logged and
//! skipped, the rest of the batch still goes out.

use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;
use crate::profile_store::ProfileTable;

use super::outbox::Outbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastCoordinator {
    admin_user_id: u64,
}

impl BroadcastCoordinator {
    pub fn new(admin_user_id: u64) -> Self {
        Self { admin_user_id }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        user_id == self.admin_user_id
    }

    /// Send `message` to every user in `table` on behalf of `invoker_id`.
    ///
    /// `render` wraps the raw message into the delivered text. Returns the number
    /// of successful sends, `AppError::Unauthorized` for anyone but the admin and
    /// `AppError::Usage` for an empty message. Nothing is sent in either error case.
    pub async fn broadcast<F>(
        &self,
        outbox: &dyn Outbox,
        table: &ProfileTable,
        invoker_id: u64,
        message: &str,
        render: F,
    ) -> AppResult<usize>
    where
        F: FnOnce(&str) -> String,
    {
        if !self.is_admin(invoker_id) {
            return Err(AppError::Unauthorized(format!(
                "user {} may not broadcast",
                invoker_id
            )));
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Usage("broadcast text is empty".to_string()));
        }

        let text = render(message);
        let mut sent = 0;

        for user_id in table.keys() {
            let chat_id = match user_id.parse::<i64>() {
                Ok(id) => ChatId(id),
                Err(e) => {
                    warn!(recipient = %user_id, "Skipping broadcast recipient with non-numeric ID");
                    error_logging::log_delivery_error(&e, "broadcast", user_id);
                    observability::record_broadcast_delivery(false);
                    continue;
                }
            };

            match outbox.send_text(chat_id, text.clone(), None).await {
                Ok(()) => {
                    sent += 1;
                    observability::record_broadcast_delivery(true);
                }
                Err(e) => {
                    error_logging::log_delivery_error(&e, "broadcast", user_id);
                    observability::record_broadcast_delivery(false);
                }
            }
        }

        info!(
            sent = sent,
            recipients = table.len(),
            "Broadcast finished"
        );
        Ok(sent)
    }
}
