use chrono::{Datelike as _, Days, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::warn;

/// Walks every calendar day of `[start, end]` inclusive.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let mut current = start;

    std::iter::from_fn(move || {
        if current > end {
            return None;
        }

        let day = current;
        current = current.checked_add_days(Days::new(1))?;
        Some(day)
    })
}

fn days_in_month(year: i32, month: u32) -> i64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };

    (next - first).num_days()
}

/// Prorates a monthly figure over `[start, end]` inclusive.
///
/// Each overlapping month contributes `amount * overlap_days / days_in_month`,
/// so a period spanning exactly one full calendar month yields `amount` back
/// with no rounding loss.
pub fn prorate_monthly(amount: Decimal, start: NaiveDate, end: NaiveDate) -> Decimal {
    if amount.is_zero() || end < start {
        return Decimal::ZERO;
    }

    let mut total = Decimal::ZERO;
    let mut cursor = start;

    while cursor <= end {
        let month_days = days_in_month(cursor.year(), cursor.month());
        let month_end = NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), month_days as u32).unwrap();
        let overlap_end = month_end.min(end);
        let overlap_days = (overlap_end - cursor).num_days() + 1;

        total += amount * Decimal::from(overlap_days) / Decimal::from(month_days);

        let Some(next) = month_end.checked_add_days(Days::new(1)) else { break };
        cursor = next;
    }

    total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Unparseable input is an error.
    Strict,
    /// Unparseable input falls back to the provided default with a warning.
    /// Reserved for legacy import paths; never used for monetary values.
    Lenient,
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%m/%d/%Y"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%I:%M %p"];

/// Tries the ordered date format list; in lenient mode a total miss yields `fallback`.
pub fn parse_date(input: &str, mode: ParseMode, fallback: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    match mode {
        ParseMode::Strict => None,
        ParseMode::Lenient => {
            warn!("unparseable date {trimmed:?}, falling back to {fallback}");
            Some(fallback)
        }
    }
}

/// Same contract as [`parse_date`] for times of day.
pub fn parse_time(input: &str, mode: ParseMode, fallback: NaiveTime) -> Option<NaiveTime> {
    let trimmed = input.trim();

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, format) {
            return Some(time);
        }
    }

    match mode {
        ParseMode::Strict => None,
        ParseMode::Lenient => {
            warn!("unparseable time {trimmed:?}, falling back to {fallback}");
            Some(fallback)
        }
    }
}

/// Converts a minute count into decimal hours.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    #[test]
    fn test_days_between() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();

        let days: Vec<_> = days_between(start, end).collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], start);
        assert_eq!(days[4], end);
    }

    #[test]
    fn test_prorate_full_month_is_exact() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        assert_eq!(prorate_monthly(dec!(3_000_000), start, end), dec!(3_000_000));
    }

    #[test]
    fn test_prorate_across_month_boundary() {
        // 15 of June's 30 days plus 10 of July's 31 days.
        let start = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 10).unwrap();

        let expected = dec!(3100) * dec!(15) / dec!(30) + dec!(3100) * dec!(10) / dec!(31);
        assert_eq!(prorate_monthly(dec!(3100), start, end), expected);
    }

    #[test]
    fn test_parse_date_format_list() {
        let fallback = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        assert_eq!(parse_date("2024-06-15", ParseMode::Strict, fallback), Some(expected));
        assert_eq!(parse_date("15/06/2024", ParseMode::Strict, fallback), Some(expected));
        assert_eq!(parse_date("15-06-2024", ParseMode::Strict, fallback), Some(expected));
        assert_eq!(parse_date("garbage", ParseMode::Strict, fallback), None);
        assert_eq!(parse_date("garbage", ParseMode::Lenient, fallback), Some(fallback));
    }

    #[test]
    fn test_parse_time_format_list() {
        let fallback = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let expected = NaiveTime::from_hms_opt(8, 30, 0).unwrap();

        assert_eq!(parse_time("08:30:00", ParseMode::Strict, fallback), Some(expected));
        assert_eq!(parse_time("08:30", ParseMode::Strict, fallback), Some(expected));
        assert_eq!(parse_time("late", ParseMode::Strict, fallback), None);
    }

    #[test]
    fn test_minutes_to_hours() {
        assert_eq!(minutes_to_hours(25).round_dp(4), dec!(0.4167));
        assert_eq!(minutes_to_hours(480), dec!(8));
    }
}
