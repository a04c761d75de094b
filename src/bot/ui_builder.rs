//! UI Builder module for creating inline keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::{t_lang, LocalizationManager};

use super::events::CallbackTag;

fn button(
    localization: &LocalizationManager,
    label_key: &str,
    tag: CallbackTag,
    language_code: Option<&str>,
) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(
        t_lang(localization, label_key, language_code),
        tag.as_str().to_string(),
    )
}

/// Keyboard attached to the welcome message: Menu / Stats / Help, one per row
pub fn create_welcome_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(localization, "button-menu", CallbackTag::Menu, language_code)],
        vec![button(localization, "button-stats", CallbackTag::Stats, language_code)],
        vec![button(localization, "button-help", CallbackTag::Help, language_code)],
    ])
}

/// Main menu keyboard: Stats / Notify / Feedback / Help, one per row
pub fn create_menu_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(localization, "button-my-stats", CallbackTag::Stats, language_code)],
        vec![button(localization, "button-notify", CallbackTag::Notify, language_code)],
        vec![button(localization, "button-feedback", CallbackTag::Feedback, language_code)],
        vec![button(localization, "button-help", CallbackTag::Help, language_code)],
    ])
}
