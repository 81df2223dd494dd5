//! # Lunchbox
//!
//! A Telegram bot for ordering office meals from a weekly menu. Administrators
//! publish the menu as a pasted text or a spreadsheet; users pick dishes per
//! day into a cart; administrators pull aggregated reports.

pub mod bot;
pub mod cart;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod localization;
pub mod menu;
pub mod report;
pub mod session;
pub mod spreadsheet;
pub mod store;
