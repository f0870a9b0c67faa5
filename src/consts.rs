use chrono::Weekday;

/// Two fingerprint punches closer than this are treated as one bounce.
pub const PUNCH_BOUNCE_MINUTES: i64 = 5;

/// How far back the absence sweep scans for uncovered working days.
pub const ABSENCE_SWEEP_DAYS: i64 = 30;

/// Weekly rest for employees without a shift assignment (legacy convention).
pub const DEFAULT_REST_DAYS: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

/// Fixed divisor for converting a monthly salary into a daily rate.
pub const MONTHLY_DAY_DIVISOR: i64 = 30;

/// An unexcused absence under the monthly system costs this many daily rates.
pub const UNEXCUSED_ABSENCE_MULTIPLIER: i64 = 2;

/// One daily leave is credited as this many hours when valuing hourly leave.
pub const LEAVE_DAY_HOURS: i64 = 8;
