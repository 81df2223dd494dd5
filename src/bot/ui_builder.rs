//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::callback_data::CallbackData;
use crate::cart::{CartLine, ClearPrompt};
use crate::localization::{t_args_lang, t_lang};
use crate::menu::{Menu, MenuDay};
use crate::report::{paginate, DayReport, DaySummary, MESSAGE_CHUNK_LIMIT};

/// Longest dish name shown on a +/- button
pub const BUTTON_LABEL_CHARS: usize = 20;

fn button(text: impl Into<String>, data: CallbackData) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, data.to_string())
}

/// Lay buttons out `per_row` to a row
pub fn arrange(buttons: Vec<InlineKeyboardButton>, per_row: usize) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .chunks(per_row.max(1))
        .map(|row| row.to_vec())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// First `max_chars` characters of a label
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Day picker for customers (`day:`) or administrators (`admin_day:`)
pub fn day_picker_keyboard(menu: &Menu, admin: bool) -> InlineKeyboardMarkup {
    let buttons = menu
        .days()
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let index = (i + 1) as i64;
            let data = if admin {
                CallbackData::AdminDay { day: index }
            } else {
                CallbackData::Day { day: index }
            };
            button(day.name.clone(), data)
        })
        .collect();
    arrange(buttons, 2)
}

/// Header shown above the dish list, including what is already ordered
pub fn format_dish_prompt(day: &str, current: &[CartLine], language_code: Option<&str>) -> String {
    let prompt = t_args_lang("choose-dish", &[("day", day)], language_code);
    if current.is_empty() {
        return prompt;
    }
    let items = current
        .iter()
        .map(|line| format!("{} x{}", line.dish, line.quantity))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}\n\n{}",
        t_args_lang("current-orders", &[("day", day), ("items", &items)], language_code),
        prompt
    )
}

/// One add button per dish, then cart and navigation buttons
pub fn dish_keyboard(day_index: i64, day: &MenuDay, language_code: Option<&str>) -> InlineKeyboardMarkup {
    let mut buttons: Vec<InlineKeyboardButton> = day
        .dishes
        .iter()
        .enumerate()
        .map(|(i, dish)| {
            button(
                t_args_lang("button-add", &[("dish", dish)], language_code),
                CallbackData::CartAdd {
                    day: day_index,
                    dish: i as i64,
                },
            )
        })
        .collect();
    buttons.push(button(
        t_lang("button-view-cart", language_code),
        CallbackData::CartView { day: day_index },
    ));
    buttons.push(button(
        t_lang("button-clear-cart", language_code),
        CallbackData::CartClear { day: day_index },
    ));
    buttons.push(button(
        t_lang("button-back-to-days", language_code),
        CallbackData::BackToDays,
    ));
    arrange(buttons, 1)
}

fn cart_line(dish: &str, quantity: i64, language_code: Option<&str>) -> String {
    t_args_lang(
        "cart-line",
        &[("dish", dish), ("quantity", &quantity.to_string())],
        language_code,
    )
}

pub fn format_cart(day: &str, lines: &[CartLine], language_code: Option<&str>) -> String {
    let mut text = t_args_lang("cart-title", &[("day", day)], language_code);
    text.push('\n');
    for line in lines {
        text.push_str(&cart_line(&line.dish, i64::from(line.quantity), language_code));
        text.push('\n');
    }
    text
}

/// +/- buttons for dishes still on the menu, then cart navigation
pub fn cart_keyboard(day_index: i64, lines: &[CartLine], language_code: Option<&str>) -> InlineKeyboardMarkup {
    let mut buttons = Vec::new();
    for line in lines {
        let Some(dish_index) = line.dish_index else {
            continue;
        };
        let label = truncate_label(&line.dish, BUTTON_LABEL_CHARS);
        let dish = dish_index as i64;
        buttons.push(button(
            format!("+ {label}"),
            CallbackData::CartInc { day: day_index, dish },
        ));
        buttons.push(button(
            format!("- {label}"),
            CallbackData::CartDec { day: day_index, dish },
        ));
    }
    buttons.push(button(
        t_lang("button-view-cart", language_code),
        CallbackData::CartView { day: day_index },
    ));
    buttons.push(button(
        t_lang("button-back-to-menu", language_code),
        CallbackData::Day { day: day_index },
    ));
    buttons.push(button(
        t_lang("button-clear-cart", language_code),
        CallbackData::CartClear { day: day_index },
    ));
    arrange(buttons, 2)
}

pub fn clear_confirm_keyboard(prompt: &ClearPrompt, language_code: Option<&str>) -> InlineKeyboardMarkup {
    arrange(
        vec![
            button(
                t_lang("button-confirm-clear", language_code),
                CallbackData::CartClearConfirm {
                    day: prompt.day_index,
                    user: prompt.target_user,
                },
            ),
            button(
                t_lang("button-cancel", language_code),
                CallbackData::CartClearCancel {
                    day: prompt.day_index,
                },
            ),
        ],
        2,
    )
}

pub fn admin_back_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    arrange(
        vec![button(t_lang("button-back", language_code), CallbackData::AdminBackDays)],
        1,
    )
}

/// Day-sectioned digest of all orders, split into sendable pages.
///
/// Each day travels as one block; a day too long for one page is cut
/// between dish lines and its header is repeated on the next page.
pub fn format_full_report(summaries: &[DaySummary]) -> Vec<String> {
    let mut blocks = Vec::new();
    for summary in summaries {
        let header = format!("\n📅 {}\n", summary.day);
        let mut block = header.clone();
        for (dish, quantity) in &summary.dishes {
            let line = format!("{dish}: {quantity}\n");
            if block.chars().count() + line.chars().count() > MESSAGE_CHUNK_LIMIT {
                blocks.push(std::mem::replace(&mut block, header.clone()));
            }
            block.push_str(&line);
        }
        blocks.push(block);
    }
    paginate(blocks, MESSAGE_CHUNK_LIMIT)
}

/// Per-user breakdown followed by dish totals, split into sendable pages
pub fn format_day_report(report: &DayReport, language_code: Option<&str>) -> Vec<String> {
    let mut blocks = vec![format!(
        "{}\n\n",
        t_args_lang("day-report-title", &[("day", &report.day)], language_code)
    )];

    for user in &report.users {
        let label = match &user.username {
            Some(name) if !name.is_empty() => format!("@{name}"),
            _ => format!("id:{}", user.user_id),
        };
        let mut block = format!("{label} ({}):\n", user.user_id);
        for (dish, quantity) in &user.items {
            block.push_str(&format!("  - {}\n", cart_line(dish, *quantity, language_code)));
        }
        block.push('\n');
        blocks.push(block);
    }

    let mut totals = format!("{}\n", t_lang("day-report-totals", language_code));
    for (dish, quantity) in &report.totals {
        let amount = t_args_lang(
            "report-quantity",
            &[("quantity", &quantity.to_string())],
            language_code,
        );
        let line = format!("  • {dish}: {amount}\n");
        // Totals may span pages line by line once they outgrow one
        if totals.chars().count() + line.chars().count() > MESSAGE_CHUNK_LIMIT {
            blocks.push(std::mem::take(&mut totals));
        }
        totals.push_str(&line);
    }
    blocks.push(totals);

    paginate(blocks, MESSAGE_CHUNK_LIMIT)
}

/// Instructions shown when an administrator starts menu entry
pub fn format_menu_help(language_code: Option<&str>) -> String {
    [
        t_lang("menu-format-title", language_code),
        t_lang("menu-format-example", language_code),
        t_lang("menu-format-example-next", language_code),
        t_lang("menu-format-footer", language_code),
    ]
    .join("\n\n")
}

pub fn format_menu_updated(day_count: usize, language_code: Option<&str>) -> String {
    format!(
        "{}\n{}\n\n{}",
        t_lang("menu-updated", language_code),
        t_lang("orders-cleared", language_code),
        t_args_lang("days-added", &[("count", &day_count.to_string())], language_code)
    )
}

pub fn format_menu_update_failed(error: &str, language_code: Option<&str>) -> String {
    format!(
        "{}\n{}",
        t_args_lang("menu-update-failed", &[("error", error)], language_code),
        t_lang("menu-update-retry", language_code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::UserOrders;

    fn callback_payloads(markup: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        use teloxide::types::InlineKeyboardButtonKind;
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        other => format!("{other:?}"),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_day_picker_two_per_row() {
        let menu = Menu::from_iter(
            ["Mon", "Tue", "Wed"]
                .iter()
                .map(|d| (d.to_string(), vec!["Soup".to_string()])),
        );
        assert_eq!(
            callback_payloads(&day_picker_keyboard(&menu, false)),
            vec![vec!["day:1", "day:2"], vec!["day:3"]]
        );
        assert_eq!(
            callback_payloads(&day_picker_keyboard(&menu, true)),
            vec![vec!["admin_day:1", "admin_day:2"], vec!["admin_day:3"]]
        );
    }

    #[test]
    fn test_cart_keyboard_skips_dishes_off_menu() {
        let lines = vec![
            CartLine {
                dish: "Soup".to_string(),
                quantity: 2,
                dish_index: Some(0),
            },
            CartLine {
                dish: "Old dish".to_string(),
                quantity: 1,
                dish_index: None,
            },
        ];
        let payloads = callback_payloads(&cart_keyboard(3, &lines, None));
        assert_eq!(payloads[0], vec!["cart_inc:3:0", "cart_dec:3:0"]);
        assert_eq!(payloads[1], vec!["cart_view:3", "day:3"]);
        assert_eq!(payloads[2], vec!["cart_clear:3"]);
    }

    #[test]
    fn test_truncate_label_counts_characters() {
        assert_eq!(truncate_label("Борщ со сметаной и зеленью", 20).chars().count(), 20);
        assert_eq!(truncate_label("Soup", 20), "Soup");
    }

    #[test]
    fn test_full_report_digest() {
        let pages = format_full_report(&[DaySummary {
            day: "Monday".to_string(),
            dishes: vec![("Soup".to_string(), 3), ("Cutlet".to_string(), 1)],
        }]);
        assert_eq!(pages, vec!["\n📅 Monday\nSoup: 3\nCutlet: 1\n".to_string()]);
    }

    #[test]
    fn test_full_report_pages_stay_under_limit() {
        let dishes: Vec<(String, i64)> = (0..150)
            .map(|i| (format!("Dish number {i:03} with a long name"), 1))
            .collect();
        let summaries: Vec<DaySummary> = ["Monday", "Tuesday", "Wednesday"]
            .iter()
            .map(|day| DaySummary {
                day: day.to_string(),
                dishes: dishes.clone(),
            })
            .collect();

        let pages = format_full_report(&summaries);
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.chars().count() <= MESSAGE_CHUNK_LIMIT));
        let joined = pages.concat();
        for day in ["Monday", "Tuesday", "Wednesday"] {
            assert!(joined.contains(&format!("📅 {day}")));
        }
        assert_eq!(joined.matches("Dish number 149 with a long name: 1").count(), 3);
    }

    #[test]
    fn test_day_report_pages_split_between_users() {
        let users: Vec<UserOrders> = (0..200)
            .map(|i| UserOrders {
                user_id: i,
                username: Some(format!("user{i:03}")),
                items: vec![("A rather long dish name for paging".to_string(), 1)],
            })
            .collect();
        let report = DayReport {
            day: "Monday".to_string(),
            users,
            totals: vec![("A rather long dish name for paging".to_string(), 200)],
        };

        let pages = format_day_report(&report, None);
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| p.chars().count() <= MESSAGE_CHUNK_LIMIT));
        assert!(pages.last().unwrap().contains("200"));
        let joined = pages.concat();
        assert!(joined.contains("@user000 (0):"));
        assert!(joined.contains("@user199 (199):"));
    }

    #[test]
    fn test_user_without_username_labelled_by_id() {
        let report = DayReport {
            day: "Monday".to_string(),
            users: vec![UserOrders {
                user_id: 77,
                username: None,
                items: vec![("Soup".to_string(), 1)],
            }],
            totals: vec![("Soup".to_string(), 1)],
        };
        let pages = format_day_report(&report, None);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("id:77 (77):"));
    }
}
