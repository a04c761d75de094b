//! Inbound events
//!
//! Teloxide updates are turned into [`InboundEvent`] values before routing so
//! the handlers never depend on the shape of raw Telegram payloads.

use teloxide::types::{
    BotCommand, CallbackQuery, ChatId, MaybeInaccessibleMessage, Message, MessageId, User,
};
use teloxide::utils::command::{BotCommands, ParseError};

use crate::localization::{t_lang, LocalizationManager};

/// Bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "initialize bot")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "show interactive menu")]
    Menu,
    #[command(description = "view your statistics")]
    Stats,
    #[command(
        description = "send message to all users (admin)",
        parse_with = parse_broadcast_text
    )]
    Broadcast(String),
}

/// Words of the broadcast text joined by single spaces; empty input is kept
/// so the handler can answer with a usage hint.
fn parse_broadcast_text(input: String) -> Result<(String,), ParseError> {
    Ok((input.split_whitespace().collect::<Vec<_>>().join(" "),))
}

/// Command list with descriptions in the given language, for `set_my_commands`
pub fn localized_bot_commands(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Vec<BotCommand> {
    ["start", "help", "menu", "stats", "broadcast"]
        .into_iter()
        .map(|name| {
            BotCommand::new(
                name,
                t_lang(localization, &format!("command-{}", name), language_code),
            )
        })
        .collect()
}

/// Inline button tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackTag {
    Menu,
    Stats,
    Help,
    Notify,
    Feedback,
}

impl CallbackTag {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "menu" => Some(CallbackTag::Menu),
            "stats" => Some(CallbackTag::Stats),
            "help" => Some(CallbackTag::Help),
            "notify" => Some(CallbackTag::Notify),
            "feedback" => Some(CallbackTag::Feedback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackTag::Menu => "menu",
            CallbackTag::Stats => "stats",
            CallbackTag::Help => "help",
            CallbackTag::Notify => "notify",
            CallbackTag::Feedback => "feedback",
        }
    }
}

/// The user behind an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl Sender {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.0,
            first_name: user.first_name.clone(),
            username: user.username.clone(),
            language_code: user.language_code.clone(),
        }
    }

    /// Key of this user in the profile table
    pub fn profile_key(&self) -> String {
        self.id.to_string()
    }
}

/// Highest-resolution variant of a received photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoInfo {
    pub file_id: String,
    pub file_size: u32,
    pub width: u32,
    pub height: u32,
}

/// An update the router knows how to handle
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Command {
        chat_id: ChatId,
        sender: Sender,
        command: Command,
    },
    Text {
        chat_id: ChatId,
        sender: Sender,
        text: String,
    },
    Photo {
        chat_id: ChatId,
        sender: Sender,
        photo: PhotoInfo,
    },
    Callback {
        chat_id: ChatId,
        /// Message carrying the pressed button, when Telegram still exposes it
        message_id: Option<MessageId>,
        sender: Sender,
        data: String,
    },
}

impl InboundEvent {
    pub fn sender(&self) -> &Sender {
        match self {
            InboundEvent::Command { sender, .. }
            | InboundEvent::Text { sender, .. }
            | InboundEvent::Photo { sender, .. }
            | InboundEvent::Callback { sender, .. } => sender,
        }
    }

    /// Metric/span label for the event type
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Command { .. } => "command",
            InboundEvent::Text { .. } => "text",
            InboundEvent::Photo { .. } => "photo",
            InboundEvent::Callback { .. } => "callback",
        }
    }

    /// Event for a message already parsed as a bot command
    pub fn from_command(msg: &Message, command: Command) -> Option<Self> {
        let sender = Sender::from_user(msg.from.as_ref()?);
        Some(InboundEvent::Command {
            chat_id: msg.chat.id,
            sender,
            command,
        })
    }

    /// Event for a non-command message.
    ///
    /// Returns `None` for anything but plain text or photos, for messages
    /// without a sender, and for unrecognised `/commands`.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let sender = Sender::from_user(msg.from.as_ref()?);

        if let Some(text) = msg.text() {
            if text.starts_with('/') {
                return None;
            }
            return Some(InboundEvent::Text {
                chat_id: msg.chat.id,
                sender,
                text: text.to_string(),
            });
        }

        let largest = msg.photo()?.last()?;
        Some(InboundEvent::Photo {
            chat_id: msg.chat.id,
            sender,
            photo: PhotoInfo {
                file_id: largest.file.id.0.clone(),
                file_size: largest.file.size,
                width: largest.width,
                height: largest.height,
            },
        })
    }

    /// Event for an inline button press; queries without data are dropped
    pub fn from_callback_query(q: &CallbackQuery) -> Option<Self> {
        let data = q.data.clone()?;
        let (chat_id, message_id) = match &q.message {
            Some(MaybeInaccessibleMessage::Regular(msg)) => (msg.chat.id, Some(msg.id)),
            Some(MaybeInaccessibleMessage::Inaccessible(_)) | None => (ChatId::from(q.from.id), None),
        };

        Some(InboundEvent::Callback {
            chat_id,
            message_id,
            sender: Sender::from_user(&q.from),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("/start", "profile_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/stats", "profile_bot").unwrap(), Command::Stats);
        assert_eq!(
            Command::parse("/menu@profile_bot", "profile_bot").unwrap(),
            Command::Menu
        );
    }

    #[test]
    fn test_parse_broadcast_normalizes_whitespace() {
        assert_eq!(
            Command::parse("/broadcast   hello    all ", "profile_bot").unwrap(),
            Command::Broadcast("hello all".to_string())
        );
    }

    #[test]
    fn test_parse_broadcast_without_text() {
        assert_eq!(
            Command::parse("/broadcast", "profile_bot").unwrap(),
            Command::Broadcast(String::new())
        );
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::parse("/unknown", "profile_bot").is_err());
    }

    #[test]
    fn test_callback_tags() {
        for tag in [
            CallbackTag::Menu,
            CallbackTag::Stats,
            CallbackTag::Help,
            CallbackTag::Notify,
            CallbackTag::Feedback,
        ] {
            assert_eq!(CallbackTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(CallbackTag::parse("MENU"), None);
        assert_eq!(CallbackTag::parse("delete_everything"), None);
    }
}
