//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `access`: Which actions are reserved for administrators
//! - `commands`: Slash commands
//! - `callback_data`: Inline button payload encoding
//! - `message_handler`: Handles commands, pasted menus and uploaded spreadsheets
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages

pub mod access;
pub mod callback_data;
pub mod callback_handler;
pub mod commands;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::cart::CartController;
use crate::config::BotConfig;
use crate::ingestion::IngestionRules;
use crate::report::ReportAggregator;
use crate::session::SessionStore;
use crate::store::Store;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use commands::Command;
pub use message_handler::{command_handler, message_handler};

/// Everything a handler needs, injected once into the dispatcher
pub struct AppState<S> {
    pub store: Arc<S>,
    pub cart: CartController<S>,
    pub reports: ReportAggregator<S>,
    pub sessions: SessionStore,
    pub config: BotConfig,
    pub rules: IngestionRules,
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>, config: BotConfig) -> Self {
        Self {
            cart: CartController::new(Arc::clone(&store)),
            reports: ReportAggregator::new(Arc::clone(&store)),
            store,
            sessions: SessionStore::new(config.menu_session_ttl),
            config,
            rules: IngestionRules::default(),
        }
    }
}

/// Update routing: commands first, then other messages, then button taps
pub fn schema<S: Store + 'static>() -> UpdateHandler<anyhow::Error> {
    let message_branch = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler::<S>),
        )
        .branch(dptree::endpoint(message_handler::<S>));

    dptree::entry()
        .branch(message_branch)
        .branch(Update::filter_callback_query().endpoint(callback_handler::<S>))
}
