//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::FileId;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::error::IngestionError;
use crate::ingestion::{check_spreadsheet_name, ingest_spreadsheet, ingest_text};
use crate::localization::t_lang;
use crate::menu::Menu;
use crate::store::Store;

use super::access::{authorize, Access, Action};
use super::commands::Command;
use super::ui_builder::{
    day_picker_keyboard, format_full_report, format_menu_help, format_menu_update_failed,
    format_menu_updated,
};
use super::AppState;

fn language_of(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// Load the menu, telling the chat why when there is nothing to show
pub async fn load_menu_or_notify<S: Store>(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState<S>,
    language_code: Option<&str>,
) -> Result<Option<Menu>> {
    match state.store.load_menu().await {
        Ok(menu) if menu.is_empty() => {
            bot.send_message(chat_id, t_lang("menu-not-loaded", language_code))
                .await?;
            Ok(None)
        }
        Ok(menu) => Ok(Some(menu)),
        Err(e) => {
            error!(chat_id = %chat_id, error = %e, "Failed to load menu");
            bot.send_message(chat_id, t_lang("menu-unavailable", language_code))
                .await?;
            Ok(None)
        }
    }
}

/// Fetch a file the user sent through the Bot API file endpoint
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>, IngestionError> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

pub async fn command_handler<S: Store + 'static>(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<AppState<S>>,
) -> Result<()> {
    let language_code = language_of(&msg);
    let user_id = msg.from.as_ref().map(|user| user.id.0);
    debug!(user_id = ?user_id, command = ?cmd, "Received command");

    if let Access::Denied(key) = authorize(&state.config, user_id, Action::from_command(&cmd)) {
        warn!(user_id = ?user_id, command = ?cmd, "Rejected admin command from non-admin");
        bot.send_message(msg.chat.id, t_lang(key, language_code))
            .await?;
        return Ok(());
    }

    match cmd {
        Command::Start => {
            if let Some(menu) = load_menu_or_notify(&bot, msg.chat.id, &state, language_code).await? {
                bot.send_message(msg.chat.id, t_lang("choose-day", language_code))
                    .reply_markup(day_picker_keyboard(&menu, false))
                    .await?;
            }
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Report => match state.reports.full_report().await {
            Ok(summaries) if summaries.is_empty() => {
                bot.send_message(msg.chat.id, t_lang("no-orders", language_code))
                    .await?;
            }
            Ok(summaries) => {
                for page in format_full_report(&summaries) {
                    bot.send_message(msg.chat.id, page).await?;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to build full report");
                bot.send_message(msg.chat.id, t_lang("menu-unavailable", language_code))
                    .await?;
            }
        },
        Command::OrdersDay => {
            if let Some(menu) = load_menu_or_notify(&bot, msg.chat.id, &state, language_code).await? {
                bot.send_message(msg.chat.id, t_lang("admin-choose-day", language_code))
                    .reply_markup(day_picker_keyboard(&menu, true))
                    .await?;
            }
        }
        Command::UpdateMenu => {
            if let Some(id) = user_id {
                state.sessions.begin_menu_entry(id).await;
                info!(user_id = id, "Administrator started menu entry");
            }
            bot.send_message(msg.chat.id, format_menu_help(language_code))
                .await?;
        }
        Command::Cancel => {
            let cleared = match user_id {
                Some(id) => state.sessions.clear(id).await,
                None => false,
            };
            let key = if cleared {
                "menu-entry-cancelled"
            } else {
                "nothing-to-cancel"
            };
            bot.send_message(msg.chat.id, t_lang(key, language_code))
                .await?;
        }
    }

    Ok(())
}

async fn handle_menu_text<S: Store>(
    bot: &Bot,
    msg: &Message,
    state: &AppState<S>,
    user_id: u64,
    text: &str,
) -> Result<()> {
    let language_code = language_of(msg);

    match ingest_text(state.store.as_ref(), text, &state.rules).await {
        Ok(day_count) => {
            state.sessions.clear(user_id).await;
            info!(user_id, day_count, "Menu replaced from text");
            bot.send_message(msg.chat.id, format_menu_updated(day_count, language_code))
                .await?;
        }
        Err(IngestionError::NoDays) => {
            warn!(user_id, "Menu text contained no day markers");
            bot.send_message(msg.chat.id, t_lang("menu-parse-failed", language_code))
                .await?;
        }
        Err(e) => {
            error!(user_id, error = %e, "Failed to replace menu from text");
            bot.send_message(
                msg.chat.id,
                format_menu_update_failed(&e.to_string(), language_code),
            )
            .await?;
        }
    }
    Ok(())
}

async fn handle_text_message<S: Store>(bot: &Bot, msg: &Message, state: &AppState<S>) -> Result<()> {
    let language_code = language_of(msg);
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(user) = msg.from.as_ref() {
        let user_id = user.id.0;
        if state.sessions.awaiting_menu(user_id).await {
            if authorize(&state.config, Some(user_id), Action::SubmitMenuText) == Access::Allowed {
                return handle_menu_text(bot, msg, state, user_id, text).await;
            }
            warn!(user_id, "Dropping menu entry of a user who is no longer an administrator");
            state.sessions.clear(user_id).await;
        }
    }

    debug!(chat_id = %msg.chat.id, "Plain text outside menu entry");
    bot.send_message(msg.chat.id, t_lang("text-hint", language_code))
        .await?;
    Ok(())
}

async fn handle_document_message<S: Store>(bot: &Bot, msg: &Message, state: &AppState<S>) -> Result<()> {
    let language_code = language_of(msg);
    let Some(doc) = msg.document() else {
        return Ok(());
    };
    let Some(user_id) = msg.from.as_ref().map(|user| user.id.0) else {
        return Ok(());
    };

    if let Access::Denied(key) = authorize(&state.config, Some(user_id), Action::UploadMenu) {
        warn!(user_id, "Rejected menu upload from non-admin");
        bot.send_message(msg.chat.id, t_lang(key, language_code))
            .await?;
        return Ok(());
    }

    let file_name = doc.file_name.clone().unwrap_or_default();
    if let Err(e) = check_spreadsheet_name(&file_name) {
        warn!(user_id, error = %e, "Rejected menu upload");
        bot.send_message(msg.chat.id, t_lang("unsupported-file", language_code))
            .await?;
        return Ok(());
    }

    info!(user_id, file_name = %file_name, "Processing menu spreadsheet");
    let outcome = match download_file(bot, doc.file.id.clone()).await {
        Ok(bytes) => ingest_spreadsheet(state.store.as_ref(), &file_name, bytes, &state.rules).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(day_count) => {
            state.sessions.clear(user_id).await;
            info!(user_id, day_count, "Menu replaced from spreadsheet");
            bot.send_message(msg.chat.id, format_menu_updated(day_count, language_code))
                .await?;
        }
        Err(e) => {
            error!(user_id, error = %e, "Failed to replace menu from spreadsheet");
            bot.send_message(
                msg.chat.id,
                format_menu_update_failed(&e.to_string(), language_code),
            )
            .await?;
        }
    }
    Ok(())
}

pub async fn message_handler<S: Store + 'static>(
    bot: Bot,
    msg: Message,
    state: Arc<AppState<S>>,
) -> Result<()> {
    if msg.document().is_some() {
        handle_document_message(&bot, &msg, &state).await?;
    } else if msg.text().is_some() {
        handle_text_message(&bot, &msg, &state).await?;
    } else {
        debug!(chat_id = %msg.chat.id, "Ignoring unsupported message type");
    }

    Ok(())
}
