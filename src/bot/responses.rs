//! Reply payloads
//!
//! Pure functions turning handler intents and profile state into reply text
//! plus an optional inline keyboard. Nothing here touches the network or the
//! profile file.

use chrono::NaiveDateTime;
use rand::Rng;
use teloxide::types::InlineKeyboardMarkup;

use crate::localization::{t_args_lang, t_lang, LocalizationManager};
use crate::profile_store::UserProfile;

use super::events::PhotoInfo;
use super::ui_builder::{create_menu_keyboard, create_welcome_keyboard};

/// Text plus optional inline keyboard
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: String) -> Self {
        Self {
            text,
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text,
            keyboard: Some(keyboard),
        }
    }
}

const GREETING_WORDS: [&str; 3] = ["hello", "hi", "hey"];
const THANKS_WORDS: [&str; 2] = ["thanks", "thank you"];

/// Fallback replies used when no keyword matches
const FILLER_KEYS: [&str; 4] = [
    "reply-filler-interesting",
    "reply-filler-understood",
    "reply-filler-got-it",
    "reply-filler-echo",
];

/// Which smart-reply branch a free-text message falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartReplyKind {
    Greeting,
    HowAreYou,
    Thanks,
    Time,
    Date,
    Filler,
}

/// Case-insensitive substring match; the first branch that matches wins.
pub fn classify_message(text: &str) -> SmartReplyKind {
    let lowered = text.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if contains_any(&GREETING_WORDS[..]) {
        SmartReplyKind::Greeting
    } else if lowered.contains("how are you") {
        SmartReplyKind::HowAreYou
    } else if contains_any(&THANKS_WORDS[..]) {
        SmartReplyKind::Thanks
    } else if lowered.contains("time") {
        SmartReplyKind::Time
    } else if lowered.contains("date") {
        SmartReplyKind::Date
    } else {
        SmartReplyKind::Filler
    }
}

pub fn welcome(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    first_name: &str,
) -> Reply {
    Reply::with_keyboard(
        t_args_lang(
            localization,
            "welcome",
            &[("first_name", first_name)],
            language_code,
        ),
        create_welcome_keyboard(localization, language_code),
    )
}

pub fn menu(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::with_keyboard(
        t_lang(localization, "menu-title", language_code),
        create_menu_keyboard(localization, language_code),
    )
}

/// Statistics for `user_id`, or the "no statistics" notice when it has no profile
pub fn stats(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    user_id: &str,
    profile: Option<&UserProfile>,
    total_users: usize,
) -> Reply {
    let Some(profile) = profile else {
        return Reply::text(t_lang(localization, "stats-unavailable", language_code));
    };

    let joined = profile.join_date.display();
    let message_count = profile.message_count.to_string();
    let total_users = total_users.to_string();

    Reply::text(t_args_lang(
        localization,
        "stats",
        &[
            ("name", profile.first_name.as_str()),
            ("joined", joined.as_str()),
            ("message_count", message_count.as_str()),
            ("user_id", user_id),
            ("total_users", total_users.as_str()),
        ],
        language_code,
    ))
}

pub fn help(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::text(t_lang(localization, "help", language_code))
}

/// Keyword-driven answer to a free-text message.
///
/// `now` feeds the time/date branches; `rng` picks the filler reply.
pub fn smart_reply<R: Rng>(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    text: &str,
    first_name: &str,
    now: NaiveDateTime,
    rng: &mut R,
) -> Reply {
    let reply = match classify_message(text) {
        SmartReplyKind::Greeting => t_args_lang(
            localization,
            "reply-greeting",
            &[("first_name", first_name)],
            language_code,
        ),
        SmartReplyKind::HowAreYou => t_lang(localization, "reply-how-are-you", language_code),
        SmartReplyKind::Thanks => t_lang(localization, "reply-thanks", language_code),
        SmartReplyKind::Time => {
            let time = now.format("%H:%M:%S").to_string();
            t_args_lang(localization, "reply-time", &[("time", time.as_str())], language_code)
        }
        SmartReplyKind::Date => {
            let date = now.format("%Y-%m-%d").to_string();
            t_args_lang(localization, "reply-date", &[("date", date.as_str())], language_code)
        }
        SmartReplyKind::Filler => {
            let key = FILLER_KEYS[rng.random_range(0..FILLER_KEYS.len())];
            t_args_lang(localization, key, &[("text", text)], language_code)
        }
    };

    Reply::text(reply)
}

pub fn photo_info(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    photo: &PhotoInfo,
) -> Reply {
    let file_size = photo.file_size.to_string();
    let width = photo.width.to_string();
    let height = photo.height.to_string();

    Reply::text(t_args_lang(
        localization,
        "photo-received",
        &[
            ("file_id", photo.file_id.as_str()),
            ("file_size", file_size.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
        ],
        language_code,
    ))
}

pub fn notify_ack(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::text(t_lang(localization, "notify-sent", language_code))
}

pub fn feedback_prompt(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::text(t_lang(localization, "feedback-prompt", language_code))
}

/// Text delivered to every recipient of a broadcast
pub fn broadcast_payload(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    message: &str,
) -> String {
    t_args_lang(
        localization,
        "broadcast-message",
        &[("message", message)],
        language_code,
    )
}

pub fn broadcast_sent(
    localization: &LocalizationManager,
    language_code: Option<&str>,
    sent: usize,
) -> Reply {
    let count = sent.to_string();
    Reply::text(t_args_lang(
        localization,
        "broadcast-sent",
        &[("count", count.as_str())],
        language_code,
    ))
}

pub fn broadcast_denied(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::text(t_lang(localization, "broadcast-no-permission", language_code))
}

pub fn broadcast_usage(localization: &LocalizationManager, language_code: Option<&str>) -> Reply {
    Reply::text(t_lang(localization, "broadcast-usage", language_code))
}
