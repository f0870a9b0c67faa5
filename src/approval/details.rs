use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::sea_orm_active_enums::TransactionType;
use crate::error::ApiError;
use crate::utils::{parse_date, parse_time, ParseMode};

/// Typed form of the transaction `details` JSON blob, one variant per
/// transaction type. Validated at construction; the stringly wire shape
/// never leaks past this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionDetails {
    Advance {
        amount: Decimal,
        date: NaiveDate,
    },
    Reward {
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    },
    Penalty {
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    },
    HourlyLeave {
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    DailyLeave {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

fn field<'a>(value: &'a Value, key: &'static str) -> Result<&'a Value, ApiError> {
    value
        .get(key)
        .ok_or_else(|| ApiError::Validation(format!("transaction details missing `{key}`")))
}

/// Monetary amounts are always strict: a number or a clean numeric string,
/// anything else is a validation error.
fn amount_field(value: &Value, key: &'static str) -> Result<Decimal, ApiError> {
    let raw = field(value, key)?;

    let parsed = match raw {
        Value::Number(number) => number.to_string().parse::<Decimal>().ok(),
        Value::String(text) => text.trim().parse::<Decimal>().ok(),
        _ => None,
    };

    let amount = parsed.ok_or_else(|| ApiError::Validation(format!("`{key}` is not a valid amount")))?;
    if amount <= Decimal::ZERO {
        return Err(ApiError::Validation(format!("`{key}` must be positive")));
    }

    Ok(amount)
}

/// Legacy blobs carry dates in several formats; unparseable ones fall back
/// to `today` with a warning rather than failing the request.
fn date_field(value: &Value, key: &'static str, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    match field(value, key)? {
        Value::String(text) => parse_date(text, ParseMode::Lenient, today)
            .ok_or_else(|| ApiError::Validation(format!("`{key}` is not a valid date"))),
        _ => Err(ApiError::Validation(format!("`{key}` is not a valid date"))),
    }
}

fn time_field(value: &Value, key: &'static str) -> Result<NaiveTime, ApiError> {
    match field(value, key)? {
        Value::String(text) => parse_time(text, ParseMode::Strict, NaiveTime::MIN)
            .ok_or_else(|| ApiError::Validation(format!("`{key}` is not a valid time"))),
        _ => Err(ApiError::Validation(format!("`{key}` is not a valid time"))),
    }
}

fn reason_field(value: &Value) -> Option<String> {
    value.get("reason").and_then(Value::as_str).map(str::to_string)
}

impl TransactionDetails {
    /// Parses a stored JSON blob for a transaction of the given type,
    /// validating every field. `today` anchors the lenient date fallback.
    pub fn parse(
        transaction_type: TransactionType,
        details: &Value,
        today: NaiveDate,
    ) -> Result<Self, ApiError> {
        let parsed = match transaction_type {
            TransactionType::Advance => Self::Advance {
                amount: amount_field(details, "amount")?,
                date: date_field(details, "date", today)?,
            },
            TransactionType::Reward => Self::Reward {
                amount: amount_field(details, "amount")?,
                date: date_field(details, "date", today)?,
                reason: reason_field(details),
            },
            TransactionType::Penalty => Self::Penalty {
                amount: amount_field(details, "amount")?,
                date: date_field(details, "date", today)?,
                reason: reason_field(details),
            },
            TransactionType::HourlyLeave => Self::HourlyLeave {
                date: date_field(details, "date", today)?,
                start_time: time_field(details, "start_time")?,
                end_time: time_field(details, "end_time")?,
            },
            TransactionType::DailyLeave => Self::DailyLeave {
                start_date: date_field(details, "start_date", today)?,
                end_date: date_field(details, "end_date", today)?,
            },
        };

        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            Self::HourlyLeave { start_time, end_time, .. } if end_time <= start_time => {
                Err(ApiError::Validation("leave end_time must be after start_time".to_string()))
            }
            Self::DailyLeave { start_date, end_date } if end_date < start_date => {
                Err(ApiError::Validation("leave end_date must not precede start_date".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Advance { .. } => TransactionType::Advance,
            Self::Reward { .. } => TransactionType::Reward,
            Self::Penalty { .. } => TransactionType::Penalty,
            Self::HourlyLeave { .. } => TransactionType::HourlyLeave,
            Self::DailyLeave { .. } => TransactionType::DailyLeave,
        }
    }

    /// Declared hour count of an hourly leave.
    pub fn leave_hours(&self) -> Option<Decimal> {
        let Self::HourlyLeave { start_time, end_time, .. } = self else {
            return None;
        };

        Some(Decimal::from((*end_time - *start_time).num_minutes()) / Decimal::from(60))
    }

    /// Declared day count of a daily leave.
    pub fn leave_days(&self) -> Option<i32> {
        let Self::DailyLeave { start_date, end_date } = self else {
            return None;
        };

        Some((*end_date - *start_date).num_days() as i32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_parse_advance() {
        let blob = json!({ "amount": 500, "date": "2024-06-10" });

        let details = TransactionDetails::parse(TransactionType::Advance, &blob, today()).unwrap();

        assert_eq!(details, TransactionDetails::Advance {
            amount: Decimal::from(500),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        });
        assert_eq!(details.transaction_type(), TransactionType::Advance);
    }

    #[test]
    fn test_parse_legacy_date_formats() {
        let blob = json!({ "amount": "250.50", "date": "10/06/2024" });

        let details = TransactionDetails::parse(TransactionType::Advance, &blob, today()).unwrap();

        let TransactionDetails::Advance { amount, date } = details else { panic!() };
        assert_eq!(amount, "250.50".parse::<Decimal>().unwrap());
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    }

    #[test]
    fn test_unparseable_date_falls_back_to_today() {
        let blob = json!({ "amount": 100, "date": "whenever" });

        let details = TransactionDetails::parse(TransactionType::Advance, &blob, today()).unwrap();

        let TransactionDetails::Advance { date, .. } = details else { panic!() };
        assert_eq!(date, today());
    }

    #[test]
    fn test_amounts_are_strict() {
        let missing = json!({ "date": "2024-06-10" });
        assert!(TransactionDetails::parse(TransactionType::Advance, &missing, today()).is_err());

        let garbage = json!({ "amount": "lots", "date": "2024-06-10" });
        assert!(TransactionDetails::parse(TransactionType::Advance, &garbage, today()).is_err());

        let negative = json!({ "amount": -5, "date": "2024-06-10" });
        assert!(TransactionDetails::parse(TransactionType::Advance, &negative, today()).is_err());
    }

    #[test]
    fn test_hourly_leave_window_and_hours() {
        let blob = json!({ "date": "2024-06-10", "start_time": "08:00", "end_time": "12:00" });

        let details = TransactionDetails::parse(TransactionType::HourlyLeave, &blob, today()).unwrap();
        assert_eq!(details.leave_hours(), Some(Decimal::from(4)));

        let inverted = json!({ "date": "2024-06-10", "start_time": "12:00", "end_time": "08:00" });
        assert!(TransactionDetails::parse(TransactionType::HourlyLeave, &inverted, today()).is_err());
    }

    #[test]
    fn test_daily_leave_day_count() {
        let blob = json!({ "start_date": "2024-06-10", "end_date": "2024-06-12" });

        let details = TransactionDetails::parse(TransactionType::DailyLeave, &blob, today()).unwrap();
        assert_eq!(details.leave_days(), Some(3));

        let inverted = json!({ "start_date": "2024-06-12", "end_date": "2024-06-10" });
        assert!(TransactionDetails::parse(TransactionType::DailyLeave, &inverted, today()).is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let details = TransactionDetails::Penalty {
            amount: Decimal::from(75),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            reason: Some("damaged stock".to_string()),
        };

        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["kind"], "penalty");
        assert_eq!(serde_json::from_value::<TransactionDetails>(value).unwrap(), details);
    }
}
