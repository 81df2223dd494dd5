//! Who may do what.
//!
//! Every handler asks [`authorize`] before acting, so the admin-only rules
//! live in one table instead of being repeated at each call site.

use crate::config::BotConfig;

use super::callback_data::CallbackData;
use super::commands::Command;

/// Something a user asked the bot to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Browsing the menu and editing one's own cart
    Order,
    FullReport,
    PickReportDay,
    DayReport,
    StartMenuEntry,
    SubmitMenuText,
    UploadMenu,
    /// `/help`, `/cancel`
    Housekeeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    /// Carries the localization key of the refusal notice
    Denied(&'static str),
}

impl Action {
    pub fn from_command(cmd: &Command) -> Self {
        match cmd {
            Command::Start => Action::Order,
            Command::Help | Command::Cancel => Action::Housekeeping,
            Command::Report => Action::FullReport,
            Command::OrdersDay => Action::PickReportDay,
            Command::UpdateMenu => Action::StartMenuEntry,
        }
    }

    pub fn from_callback(data: &CallbackData) -> Self {
        match data {
            CallbackData::AdminDay { .. } => Action::DayReport,
            CallbackData::AdminBackDays => Action::PickReportDay,
            _ => Action::Order,
        }
    }

    pub fn requires_admin(self) -> bool {
        !matches!(self, Action::Order | Action::Housekeeping)
    }

    fn refusal_key(self) -> &'static str {
        match self {
            Action::StartMenuEntry | Action::SubmitMenuText | Action::UploadMenu => "not-admin-menu",
            _ => "not-admin",
        }
    }
}

/// Decide whether `user_id` may perform `action`. A message without a
/// sender is never an administrator.
pub fn authorize(config: &BotConfig, user_id: Option<u64>, action: Action) -> Access {
    if !action.requires_admin() || user_id.is_some_and(|id| config.is_admin(id)) {
        Access::Allowed
    } else {
        Access::Denied(action.refusal_key())
    }
}
