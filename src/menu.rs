//! # Menu Module
//!
//! The weekly menu snapshot and the positional indexer used by button
//! payloads. Days are addressed 1-based, dishes 0-based, both against the
//! snapshot they were computed from.

use crate::error::ResolveError;

/// One day of the weekly menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDay {
    pub name: String,
    pub dishes: Vec<String>,
}

impl MenuDay {
    /// Resolve a 0-based dish index against this day
    pub fn resolve_dish(&self, index: i64) -> Result<&str, ResolveError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.dishes.get(i))
            .map(String::as_str)
            .ok_or_else(|| ResolveError::DishNotFound {
                day: self.name.clone(),
                index,
                dish_count: self.dishes.len(),
            })
    }

    /// 0-based position of a dish, if it is still on the menu
    pub fn dish_index(&self, dish: &str) -> Option<usize> {
        self.dishes.iter().position(|d| d == dish)
    }
}

/// Ordered mapping from day name to its ordered dish list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    days: Vec<MenuDay>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the dish list of `name`.
    ///
    /// A day seen again keeps its original position but loses the dishes
    /// collected so far.
    pub fn start_day(&mut self, name: &str) {
        match self.days.iter_mut().find(|d| d.name == name) {
            Some(day) => day.dishes.clear(),
            None => self.days.push(MenuDay {
                name: name.to_string(),
                dishes: Vec::new(),
            }),
        }
    }

    /// Append a dish to the named day, creating the day if needed
    pub fn push_dish(&mut self, day: &str, dish: &str) {
        if let Some(existing) = self.days.iter_mut().find(|d| d.name == day) {
            existing.dishes.push(dish.to_string());
        } else {
            self.days.push(MenuDay {
                name: day.to_string(),
                dishes: vec![dish.to_string()],
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn days(&self) -> &[MenuDay] {
        &self.days
    }

    pub fn day(&self, name: &str) -> Option<&MenuDay> {
        self.days.iter().find(|d| d.name == name)
    }

    /// Resolve a 1-based day index
    pub fn resolve_day(&self, index: i64) -> Result<&MenuDay, ResolveError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.days.get(i))
            .ok_or(ResolveError::DayNotFound {
                index,
                day_count: self.days.len(),
            })
    }

    /// Resolve a (1-based day, 0-based dish) pair to names
    pub fn resolve_dish(&self, day_index: i64, dish_index: i64) -> Result<(&str, &str), ResolveError> {
        let day = self.resolve_day(day_index)?;
        let dish = day.resolve_dish(dish_index)?;
        Ok((day.name.as_str(), dish))
    }

    /// 1-based position of a day
    pub fn day_index(&self, name: &str) -> Option<usize> {
        self.days.iter().position(|d| d.name == name).map(|i| i + 1)
    }
}

impl FromIterator<(String, Vec<String>)> for Menu {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut menu = Menu::new();
        for (name, dishes) in iter {
            menu.start_day(&name);
            for dish in dishes {
                menu.push_dish(&name, &dish);
            }
        }
        menu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_menu() -> Menu {
        Menu::from_iter([
            ("Monday".to_string(), vec!["Soup".to_string(), "Cutlet".to_string()]),
            ("Tuesday".to_string(), vec!["Salad".to_string()]),
        ])
    }

    #[test]
    fn test_resolve_day_bounds() {
        let menu = sample_menu();
        assert_eq!(menu.resolve_day(1).unwrap().name, "Monday");
        assert_eq!(menu.resolve_day(2).unwrap().name, "Tuesday");
        assert!(menu.resolve_day(0).is_err());
        assert!(menu.resolve_day(3).is_err());
        assert!(menu.resolve_day(-1).is_err());
    }

    #[test]
    fn test_resolve_dish_bounds() {
        let menu = sample_menu();
        assert_eq!(menu.resolve_dish(1, 0).unwrap(), ("Monday", "Soup"));
        assert_eq!(menu.resolve_dish(1, 1).unwrap(), ("Monday", "Cutlet"));
        assert_eq!(
            menu.resolve_dish(2, 1),
            Err(ResolveError::DishNotFound {
                day: "Tuesday".to_string(),
                index: 1,
                dish_count: 1,
            })
        );
        assert!(menu.resolve_dish(1, -1).is_err());
    }

    #[test]
    fn test_index_roundtrip_against_snapshot() {
        let menu = sample_menu();
        for (i, day) in menu.days().iter().enumerate() {
            let index = menu.day_index(&day.name).unwrap();
            assert_eq!(index, i + 1);
            assert_eq!(menu.resolve_day(index as i64).unwrap().name, day.name);
        }
    }

    #[test]
    fn test_restarted_day_keeps_position() {
        let mut menu = Menu::new();
        menu.start_day("Monday");
        menu.push_dish("Monday", "Soup");
        menu.start_day("Tuesday");
        menu.start_day("Monday");
        menu.push_dish("Monday", "Fish");

        assert_eq!(menu.day_index("Monday"), Some(1));
        assert_eq!(menu.day("Monday").unwrap().dishes, vec!["Fish".to_string()]);
    }

    #[test]
    fn test_empty_menu() {
        let menu = Menu::new();
        assert!(menu.is_empty());
        assert_eq!(
            menu.resolve_day(1),
            Err(ResolveError::DayNotFound {
                index: 1,
                day_count: 0
            })
        );
    }
}
