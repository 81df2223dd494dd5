//! Button payloads.
//!
//! Payloads are colon-delimited and carry only integer indices into the
//! live menu, keeping them under the platform's payload size limit.

use std::fmt;

use crate::error::PayloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    /// `day:<day_idx>`
    Day { day: i64 },
    /// `cart_add:<day_idx>:<dish_idx>`
    CartAdd { day: i64, dish: i64 },
    /// `cart_view:<day_idx>`
    CartView { day: i64 },
    /// `cart_inc:<day_idx>:<dish_idx>`
    CartInc { day: i64, dish: i64 },
    /// `cart_dec:<day_idx>:<dish_idx>`
    CartDec { day: i64, dish: i64 },
    /// `cart_clear:<day_idx>`
    CartClear { day: i64 },
    /// `cart_clear_confirm:<day_idx>:<user_id>`
    CartClearConfirm { day: i64, user: i64 },
    /// `cart_clear_cancel:<day_idx>`
    CartClearCancel { day: i64 },
    /// `back_to_days`
    BackToDays,
    /// `admin_day:<day_idx>`
    AdminDay { day: i64 },
    /// `admin_back_days`
    AdminBackDays,
}

impl CallbackData {
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let mut parts = payload.split(':');
        let action = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        let arity = |count: usize| -> Result<(), PayloadError> {
            if fields.len() == count {
                Ok(())
            } else {
                Err(PayloadError::FieldCount {
                    payload: payload.to_string(),
                    expected: count,
                })
            }
        };
        let number = |i: usize| -> Result<i64, PayloadError> {
            fields[i].trim().parse().map_err(|_| PayloadError::NotANumber {
                payload: payload.to_string(),
                field: fields[i].to_string(),
            })
        };

        let data = match action {
            "day" => {
                arity(1)?;
                CallbackData::Day { day: number(0)? }
            }
            "cart_add" => {
                arity(2)?;
                CallbackData::CartAdd {
                    day: number(0)?,
                    dish: number(1)?,
                }
            }
            "cart_view" => {
                arity(1)?;
                CallbackData::CartView { day: number(0)? }
            }
            "cart_inc" => {
                arity(2)?;
                CallbackData::CartInc {
                    day: number(0)?,
                    dish: number(1)?,
                }
            }
            "cart_dec" => {
                arity(2)?;
                CallbackData::CartDec {
                    day: number(0)?,
                    dish: number(1)?,
                }
            }
            "cart_clear" => {
                arity(1)?;
                CallbackData::CartClear { day: number(0)? }
            }
            "cart_clear_confirm" => {
                arity(2)?;
                CallbackData::CartClearConfirm {
                    day: number(0)?,
                    user: number(1)?,
                }
            }
            "cart_clear_cancel" => {
                arity(1)?;
                CallbackData::CartClearCancel { day: number(0)? }
            }
            "back_to_days" => {
                arity(0)?;
                CallbackData::BackToDays
            }
            "admin_day" => {
                arity(1)?;
                CallbackData::AdminDay { day: number(0)? }
            }
            "admin_back_days" => {
                arity(0)?;
                CallbackData::AdminBackDays
            }
            other => return Err(PayloadError::UnknownAction(other.to_string())),
        };
        Ok(data)
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Day { day } => write!(f, "day:{day}"),
            CallbackData::CartAdd { day, dish } => write!(f, "cart_add:{day}:{dish}"),
            CallbackData::CartView { day } => write!(f, "cart_view:{day}"),
            CallbackData::CartInc { day, dish } => write!(f, "cart_inc:{day}:{dish}"),
            CallbackData::CartDec { day, dish } => write!(f, "cart_dec:{day}:{dish}"),
            CallbackData::CartClear { day } => write!(f, "cart_clear:{day}"),
            CallbackData::CartClearConfirm { day, user } => {
                write!(f, "cart_clear_confirm:{day}:{user}")
            }
            CallbackData::CartClearCancel { day } => write!(f, "cart_clear_cancel:{day}"),
            CallbackData::BackToDays => write!(f, "back_to_days"),
            CallbackData::AdminDay { day } => write!(f, "admin_day:{day}"),
            CallbackData::AdminBackDays => write!(f, "admin_back_days"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_payloads() {
        assert_eq!(CallbackData::parse("day:3"), Ok(CallbackData::Day { day: 3 }));
        assert_eq!(
            CallbackData::parse("cart_add:1:0"),
            Ok(CallbackData::CartAdd { day: 1, dish: 0 })
        );
        assert_eq!(
            CallbackData::parse("cart_clear_confirm:2:123456789"),
            Ok(CallbackData::CartClearConfirm {
                day: 2,
                user: 123456789
            })
        );
        assert_eq!(CallbackData::parse("back_to_days"), Ok(CallbackData::BackToDays));
        assert_eq!(
            CallbackData::parse("admin_back_days"),
            Ok(CallbackData::AdminBackDays)
        );
    }

    #[test]
    fn test_clear_is_not_confused_with_confirm() {
        assert_eq!(
            CallbackData::parse("cart_clear:4"),
            Ok(CallbackData::CartClear { day: 4 })
        );
        assert_eq!(
            CallbackData::parse("cart_clear_cancel:4"),
            Ok(CallbackData::CartClearCancel { day: 4 })
        );
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            CallbackData::parse("cart_add:1"),
            Err(PayloadError::FieldCount { expected: 2, .. })
        ));
        assert!(matches!(
            CallbackData::parse("day:x"),
            Err(PayloadError::NotANumber { .. })
        ));
        assert!(matches!(
            CallbackData::parse("back_to_days:1"),
            Err(PayloadError::FieldCount { expected: 0, .. })
        ));
        assert!(matches!(
            CallbackData::parse("launch:1"),
            Err(PayloadError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_negative_indices_parse_and_fail_later() {
        // Range checks belong to the indexer, not the payload decoder
        assert_eq!(
            CallbackData::parse("cart_dec:-1:0"),
            Ok(CallbackData::CartDec { day: -1, dish: 0 })
        );
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(CallbackData::CartInc { day: 2, dish: 5 }.to_string(), "cart_inc:2:5");
        assert_eq!(
            CallbackData::CartClearConfirm { day: 1, user: 99 }.to_string(),
            "cart_clear_confirm:1:99"
        );
    }
}
