//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error, warn};

use crate::cart::{CartChange, Customer};
use crate::error::{CartError, ResolveError};
use crate::localization::{t_args_lang, t_lang};
use crate::store::Store;

use super::access::{authorize, Access, Action};
use super::callback_data::CallbackData;
use super::message_handler::load_menu_or_notify;
use super::ui_builder::{
    admin_back_keyboard, cart_keyboard, clear_confirm_keyboard, day_picker_keyboard, dish_keyboard,
    format_cart, format_day_report, format_dish_prompt,
};
use super::AppState;

/// How the tapped button is acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Silent,
    Toast(String),
    Alert(String),
}

/// Whether a failed store call was reading or writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Write,
}

fn cart_error_answer(
    user_id: i64,
    err: &CartError,
    operation: Operation,
    language_code: Option<&str>,
) -> Answer {
    match err {
        CartError::Resolve(ResolveError::DayNotFound { .. }) => {
            warn!(user_id, error = %err, "Stale or invalid day button");
            Answer::Alert(t_lang("invalid-day", language_code))
        }
        CartError::Resolve(ResolveError::DishNotFound { .. }) => {
            warn!(user_id, error = %err, "Stale or invalid dish button");
            Answer::Alert(t_lang("invalid-dish", language_code))
        }
        CartError::Forbidden { .. } => {
            warn!(user_id, error = %err, "Rejected clearing another user's cart");
            Answer::Alert(t_lang("clear-forbidden", language_code))
        }
        CartError::Store(e) => {
            error!(user_id, error = %e, operation = ?operation, "Store failure while handling button");
            let key = match operation {
                Operation::Read => "menu-unavailable",
                Operation::Write => "order-not-saved",
            };
            Answer::Alert(t_lang(key, language_code))
        }
    }
}

async fn answer_query(bot: &Bot, q: &CallbackQuery, answer: Answer) -> Result<()> {
    match answer {
        Answer::Silent => bot.answer_callback_query(q.id.clone()).await?,
        Answer::Toast(text) => bot.answer_callback_query(q.id.clone()).text(text).await?,
        Answer::Alert(text) => {
            bot.answer_callback_query(q.id.clone())
                .text(text)
                .show_alert(true)
                .await?
        }
    };
    Ok(())
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler<S: Store + 'static>(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState<S>>,
) -> Result<()> {
    let user_id = q.from.id.0 as i64;
    let language_code = q.from.language_code.as_deref();
    let payload = q.data.as_deref().unwrap_or("");
    debug!(user_id, payload, "Received callback query from user");

    let data = match CallbackData::parse(payload) {
        Ok(data) => data,
        Err(e) => {
            warn!(user_id, error = %e, "Malformed callback payload");
            return answer_query(&bot, &q, Answer::Alert(t_lang("invalid-button", language_code))).await;
        }
    };

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        return answer_query(&bot, &q, Answer::Silent).await;
    };

    let outcome = match authorize(&state.config, Some(q.from.id.0), Action::from_callback(&data)) {
        Access::Denied(key) => {
            warn!(user_id, payload, "Rejected admin button from non-admin");
            Ok(Answer::Alert(t_lang(key, language_code)))
        }
        Access::Allowed => handle_button(&bot, chat_id, &q, data, &state).await,
    };

    // The query is answered even when handling failed, to stop the spinner
    let answer = match &outcome {
        Ok(answer) => answer.clone(),
        Err(e) => {
            error!(user_id, payload, error = %e, "Failed to handle button");
            Answer::Alert(t_lang("error-generic", language_code))
        }
    };
    answer_query(&bot, &q, answer).await?;
    outcome.map(|_| ())
}

async fn handle_button<S: Store>(
    bot: &Bot,
    chat_id: ChatId,
    q: &CallbackQuery,
    data: CallbackData,
    state: &AppState<S>,
) -> Result<Answer> {
    let user_id = q.from.id.0 as i64;
    let language_code = q.from.language_code.as_deref();

    let answer = match data {
        CallbackData::Day { day } => show_day(bot, chat_id, state, user_id, day, language_code).await?,
        CallbackData::BackToDays => {
            if let Some(menu) = load_menu_or_notify(bot, chat_id, state, language_code).await? {
                bot.send_message(chat_id, t_lang("choose-day", language_code))
                    .reply_markup(day_picker_keyboard(&menu, false))
                    .await?;
            }
            Answer::Silent
        }
        CallbackData::CartAdd { day, dish } => {
            let customer = Customer::new(user_id, q.from.username.as_deref());
            match state.cart.add_at(&customer, day, dish).await {
                Ok(CartChange::Quantity { dish, .. }) => {
                    Answer::Toast(t_args_lang("added", &[("dish", &dish)], language_code))
                }
                Ok(_) => Answer::Silent,
                Err(e) => cart_error_answer(user_id, &e, Operation::Write, language_code),
            }
        }
        CallbackData::CartView { day } => {
            show_cart(bot, chat_id, state, user_id, day, language_code).await?
        }
        CallbackData::CartInc { day, dish } => match state.cart.increment_at(user_id, day, dish).await {
            Ok(_) => Answer::Toast(t_lang("quantity-increased", language_code)),
            Err(e) => cart_error_answer(user_id, &e, Operation::Write, language_code),
        },
        CallbackData::CartDec { day, dish } => match state.cart.decrement_at(user_id, day, dish).await {
            Ok(_) => Answer::Toast(t_lang("quantity-updated", language_code)),
            Err(e) => cart_error_answer(user_id, &e, Operation::Write, language_code),
        },
        CallbackData::CartClear { day } => match state.cart.request_clear(user_id, day).await {
            Ok(prompt) => {
                bot.send_message(
                    chat_id,
                    t_args_lang("clear-confirm-prompt", &[("day", &prompt.day)], language_code),
                )
                .reply_markup(clear_confirm_keyboard(&prompt, language_code))
                .await?;
                Answer::Silent
            }
            Err(e) => cart_error_answer(user_id, &e, Operation::Read, language_code),
        },
        CallbackData::CartClearConfirm { day, user } => {
            match state.cart.confirm_clear(user_id, day, user).await {
                Ok(_) => Answer::Alert(t_lang("cart-cleared", language_code)),
                Err(e) => cart_error_answer(user_id, &e, Operation::Write, language_code),
            }
        }
        CallbackData::CartClearCancel { .. } => Answer::Alert(t_lang("clear-cancelled", language_code)),
        CallbackData::AdminDay { day } => {
            show_day_report(bot, chat_id, state, user_id, day, language_code).await?
        }
        CallbackData::AdminBackDays => {
            if let Some(menu) = load_menu_or_notify(bot, chat_id, state, language_code).await? {
                bot.send_message(chat_id, t_lang("admin-choose-day", language_code))
                    .reply_markup(day_picker_keyboard(&menu, true))
                    .await?;
            }
            Answer::Silent
        }
    };
    Ok(answer)
}

/// Dish list for one day with the user's current orders on top
async fn show_day<S: Store>(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState<S>,
    user_id: i64,
    day_index: i64,
    language_code: Option<&str>,
) -> Result<Answer> {
    let menu = match state.store.load_menu().await {
        Ok(menu) => menu,
        Err(e) => return Ok(cart_error_answer(user_id, &CartError::Store(e), Operation::Read, language_code)),
    };
    let day = match menu.resolve_day(day_index) {
        Ok(day) => day,
        Err(e) => return Ok(cart_error_answer(user_id, &e.into(), Operation::Read, language_code)),
    };

    if day.dishes.is_empty() {
        bot.send_message(chat_id, t_lang("no-dishes", language_code))
            .await?;
        return Ok(Answer::Silent);
    }

    let current = match state.cart.view(user_id, &day.name).await {
        Ok(lines) => lines,
        Err(e) => return Ok(cart_error_answer(user_id, &e, Operation::Read, language_code)),
    };

    bot.send_message(chat_id, format_dish_prompt(&day.name, &current, language_code))
        .reply_markup(dish_keyboard(day_index, day, language_code))
        .await?;
    Ok(Answer::Silent)
}

async fn show_cart<S: Store>(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState<S>,
    user_id: i64,
    day_index: i64,
    language_code: Option<&str>,
) -> Result<Answer> {
    let menu = match state.store.load_menu().await {
        Ok(menu) => menu,
        Err(e) => return Ok(cart_error_answer(user_id, &CartError::Store(e), Operation::Read, language_code)),
    };
    let day = match menu.resolve_day(day_index) {
        Ok(day) => day.name.clone(),
        Err(e) => return Ok(cart_error_answer(user_id, &e.into(), Operation::Read, language_code)),
    };

    let lines = match state.cart.view(user_id, &day).await {
        Ok(lines) => lines,
        Err(e) => return Ok(cart_error_answer(user_id, &e, Operation::Read, language_code)),
    };
    if lines.is_empty() {
        return Ok(Answer::Alert(t_lang("cart-empty", language_code)));
    }

    bot.send_message(chat_id, format_cart(&day, &lines, language_code))
        .reply_markup(cart_keyboard(day_index, &lines, language_code))
        .await?;
    Ok(Answer::Silent)
}

async fn show_day_report<S: Store>(
    bot: &Bot,
    chat_id: ChatId,
    state: &AppState<S>,
    user_id: i64,
    day_index: i64,
    language_code: Option<&str>,
) -> Result<Answer> {
    let report = match state.reports.day_report_at(day_index).await {
        Ok(report) => report,
        Err(e) => return Ok(cart_error_answer(user_id, &e, Operation::Read, language_code)),
    };

    if report.is_empty() {
        bot.send_message(
            chat_id,
            t_args_lang("no-orders-day", &[("day", &report.day)], language_code),
        )
        .await?;
        return Ok(Answer::Silent);
    }

    let pages = format_day_report(&report, language_code);
    let last = pages.len().saturating_sub(1);
    for (i, page) in pages.into_iter().enumerate() {
        if i == last {
            bot.send_message(chat_id, page)
                .reply_markup(admin_back_keyboard(language_code))
                .await?;
        } else {
            bot.send_message(chat_id, page).await?;
        }
    }
    Ok(Answer::Silent)
}
