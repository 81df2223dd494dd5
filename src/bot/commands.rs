use teloxide::utils::command::BotCommands;

/// Slash commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Supported commands:")]
pub enum Command {
    #[command(description = "open the weekly menu")]
    Start,
    #[command(description = "show this list")]
    Help,
    #[command(description = "order totals for every day (admins)")]
    Report,
    #[command(description = "per-user orders for one day (admins)")]
    OrdersDay,
    #[command(description = "paste a new weekly menu (admins)")]
    UpdateMenu,
    #[command(description = "stop entering a menu")]
    Cancel,
}
