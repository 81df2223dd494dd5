//! # Menu Ingestion
//!
//! Turns an uploaded spreadsheet or a pasted text block into a [`Menu`] and
//! swaps it in for the current one. Replacing the menu always empties the
//! order table.
//!
//! A line or cell is a day marker when it starts with one of the configured
//! keywords; the rest of it, trimmed, is the day name. Non-empty lines after
//! a marker are dishes of that day. Spreadsheets additionally drop section
//! headers such as "Soups".

use tracing::{debug, info, warn};

use crate::error::IngestionError;
use crate::menu::Menu;
use crate::store::Store;

/// Keywords and noise tokens used while parsing a menu
#[derive(Debug, Clone)]
pub struct IngestionRules {
    pub day_markers: Vec<String>,
    /// Exact cell values skipped in spreadsheets
    pub section_headers: Vec<String>,
}

impl Default for IngestionRules {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            day_markers: owned(&["Menu", "Меню"]),
            section_headers: owned(&[
                "Breakfast",
                "Salads",
                "Soups",
                "Second course",
                "Завтрак",
                "Салаты",
                "Супы",
                "супы",
                "Второе Горячее",
            ]),
        }
    }
}

impl IngestionRules {
    /// Day name carried by `value` when it is a day marker
    fn day_marker<'a>(&self, value: &'a str) -> Option<&'a str> {
        self.day_markers
            .iter()
            .find_map(|marker| value.strip_prefix(marker.as_str()))
            .map(str::trim)
    }

    fn is_section_header(&self, value: &str) -> bool {
        self.section_headers.iter().any(|h| h == value)
    }
}

/// Collects days and dishes while values stream past
struct MenuBuilder<'r> {
    rules: &'r IngestionRules,
    filter_headers: bool,
    menu: Menu,
    current_day: Option<String>,
}

impl<'r> MenuBuilder<'r> {
    fn new(rules: &'r IngestionRules, filter_headers: bool) -> Self {
        Self {
            rules,
            filter_headers,
            menu: Menu::new(),
            current_day: None,
        }
    }

    fn feed(&mut self, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        if let Some(day) = self.rules.day_marker(value) {
            // A bare marker is a title, not a day; it closes the open day
            if day.is_empty() {
                debug!(marker = value, "Skipping day marker without a day name");
                self.current_day = None;
                return;
            }
            self.menu.start_day(day);
            self.current_day = Some(day.to_string());
            return;
        }
        if self.filter_headers && self.rules.is_section_header(value) {
            return;
        }
        if let Some(day) = &self.current_day {
            self.menu.push_dish(day, value);
        }
    }

    fn finish(self) -> Menu {
        self.menu
    }
}

/// Parse a pasted text menu, one entry per line
pub fn parse_menu_text(text: &str, rules: &IngestionRules) -> Menu {
    let mut builder = MenuBuilder::new(rules, false);
    for line in text.lines() {
        builder.feed(line);
    }
    builder.finish()
}

/// Parse a spreadsheet grid given as columns of text cells, read column by
/// column from top to bottom. Non-text cells are `None`.
pub fn parse_menu_columns(columns: &[Vec<Option<String>>], rules: &IngestionRules) -> Menu {
    let mut builder = MenuBuilder::new(rules, true);
    for cell in columns.iter().flatten().flatten() {
        builder.feed(cell);
    }
    builder.finish()
}

/// Only Excel workbooks are accepted for upload
pub fn check_spreadsheet_name(file_name: &str) -> Result<(), IngestionError> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        Ok(())
    } else {
        Err(IngestionError::UnsupportedFile(file_name.to_string()))
    }
}

/// Replace the stored menu with `menu`, clearing all orders.
///
/// Returns the number of days stored. An empty menu is rejected before the
/// store is touched.
pub async fn replace_menu<S: Store>(store: &S, menu: &Menu) -> Result<usize, IngestionError> {
    if menu.is_empty() {
        warn!("Rejected menu without day markers");
        return Err(IngestionError::NoDays);
    }
    store.replace_menu(menu).await?;
    info!(days = menu.day_count(), "Menu ingested");
    Ok(menu.day_count())
}

/// Parse and store a pasted text menu
pub async fn ingest_text<S: Store>(
    store: &S,
    text: &str,
    rules: &IngestionRules,
) -> Result<usize, IngestionError> {
    let menu = parse_menu_text(text, rules);
    replace_menu(store, &menu).await
}

/// Decode, parse and store an uploaded workbook
pub async fn ingest_spreadsheet<S: Store>(
    store: &S,
    file_name: &str,
    bytes: Vec<u8>,
    rules: &IngestionRules,
) -> Result<usize, IngestionError> {
    check_spreadsheet_name(file_name)?;
    let columns = crate::spreadsheet::read_first_sheet_columns(bytes)?;
    let menu = parse_menu_columns(&columns, rules);
    replace_menu(store, &menu).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    #[test]
    fn test_text_ignores_lines_before_first_marker() {
        let menu = parse_menu_text("Hello\nMenu Friday\nPizza", &IngestionRules::default());
        assert_eq!(menu.day_count(), 1);
        assert_eq!(menu.day("Friday").unwrap().dishes, vec!["Pizza".to_string()]);
    }

    #[test]
    fn test_text_keeps_section_headers() {
        let menu = parse_menu_text("Menu Monday\nSoups\nBorscht", &IngestionRules::default());
        assert_eq!(
            menu.day("Monday").unwrap().dishes,
            vec!["Soups".to_string(), "Borscht".to_string()]
        );
    }

    #[test]
    fn test_columns_filter_section_headers() {
        let columns = vec![
            cells(&["Menu Monday", "Breakfast", "Porridge", "", "Soups", "Borscht"]),
            cells(&["Menu Tuesday", "Salads", "Greek salad"]),
        ];
        let menu = parse_menu_columns(&columns, &IngestionRules::default());
        assert_eq!(
            menu.day("Monday").unwrap().dishes,
            vec!["Porridge".to_string(), "Borscht".to_string()]
        );
        assert_eq!(menu.day("Tuesday").unwrap().dishes, vec!["Greek salad".to_string()]);
    }

    #[test]
    fn test_text_skips_marker_without_day_name() {
        let menu = parse_menu_text("Menu\nSoup\nMenu Monday\nFish", &IngestionRules::default());
        let days: Vec<&str> = menu.days().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(days, vec!["Monday"]);
        assert_eq!(menu.day("Monday").unwrap().dishes, vec!["Fish".to_string()]);
    }

    #[test]
    fn test_bare_marker_closes_the_open_day() {
        let menu = parse_menu_text("Menu Monday\nFish\nМеню  \nSoup", &IngestionRules::default());
        assert_eq!(menu.day_count(), 1);
        assert_eq!(menu.day("Monday").unwrap().dishes, vec!["Fish".to_string()]);
    }

    #[test]
    fn test_columns_skip_title_marker() {
        let only_title = vec![cells(&["Меню", "Борщ"])];
        assert!(parse_menu_columns(&only_title, &IngestionRules::default()).is_empty());

        let columns = vec![cells(&["Menu", "Menu Tuesday", "Soups", "Borscht"])];
        let menu = parse_menu_columns(&columns, &IngestionRules::default());
        assert!(menu.days().iter().all(|d| !d.name.is_empty()));
        assert_eq!(menu.day("Tuesday").unwrap().dishes, vec!["Borscht".to_string()]);
    }

    #[test]
    fn test_russian_markers() {
        let menu = parse_menu_text("Меню Понедельник\nБорщ", &IngestionRules::default());
        assert_eq!(menu.day("Понедельник").unwrap().dishes, vec!["Борщ".to_string()]);
    }

    #[test]
    fn test_spreadsheet_name_check() {
        assert!(check_spreadsheet_name("menu.xlsx").is_ok());
        assert!(check_spreadsheet_name("MENU.XLS").is_ok());
        assert!(matches!(
            check_spreadsheet_name("menu.csv"),
            Err(IngestionError::UnsupportedFile(_))
        ));
        assert!(check_spreadsheet_name("").is_err());
    }
}
