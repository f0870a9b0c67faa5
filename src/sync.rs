//! Fingerprint device sync. Takes an unordered punch batch, groups it per
//! badge and calendar day, and folds each group into the single attendance
//! row for that employee+date.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::consts::PUNCH_BOUNCE_MINUTES;

/// One raw event as delivered by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    pub fingerprint_id: String,
    pub timestamp: NaiveDateTime,
    pub device: Option<String>,
}

/// What the sized-up attendance row looks like mid-merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRow {
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
}

/// The write (if any) a single punch implies against the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// No row for this employee+date yet.
    Create { check_in: NaiveDateTime },
    /// Punch precedes the stored check-in; it is the true start.
    MoveCheckInEarlier { check_in: NaiveDateTime },
    /// First event past the bounce window closes the open row.
    SetCheckOut { check_out: NaiveDateTime },
    /// A later event pushes an existing check-out further out.
    ExtendCheckOut { check_out: NaiveDateTime },
    /// Duplicate, bounce, or stale event.
    Skip,
}

impl MergeAction {
    /// Applies the action to the in-flight row state.
    pub fn apply(&self, current: Option<OpenRow>) -> Option<OpenRow> {
        match *self {
            Self::Create { check_in } => Some(OpenRow { check_in, check_out: None }),
            Self::MoveCheckInEarlier { check_in } => {
                current.map(|row| OpenRow { check_in, ..row })
            }
            Self::SetCheckOut { check_out } | Self::ExtendCheckOut { check_out } => {
                current.map(|row| OpenRow { check_out: Some(check_out), ..row })
            }
            Self::Skip => current,
        }
    }
}

/// Decides what one punch does to the current attendance row. Punches at or
/// after the check-in but within [`PUNCH_BOUNCE_MINUTES`] of it are sensor
/// bounce; an earlier punch always wins as the real check-in.
pub fn merge_decision(current: Option<OpenRow>, at: NaiveDateTime) -> MergeAction {
    let Some(row) = current else {
        return MergeAction::Create { check_in: at };
    };

    if at < row.check_in {
        return MergeAction::MoveCheckInEarlier { check_in: at };
    }

    if (at - row.check_in).num_minutes() < PUNCH_BOUNCE_MINUTES {
        return MergeAction::Skip;
    }

    match row.check_out {
        None => MergeAction::SetCheckOut { check_out: at },
        Some(out) if at > out => MergeAction::ExtendCheckOut { check_out: at },
        Some(_) => MergeAction::Skip,
    }
}

/// Groups a batch by (badge, calendar date), each group sorted
/// chronologically so delivery order stops mattering.
pub fn group_punches(
    batch: Vec<RawPunch>,
) -> BTreeMap<(String, NaiveDate), Vec<RawPunch>> {
    let mut groups: BTreeMap<(String, NaiveDate), Vec<RawPunch>> = BTreeMap::new();

    for punch in batch {
        let key = (punch.fingerprint_id.clone(), punch.timestamp.date());
        groups.entry(key).or_default().push(punch);
    }

    for group in groups.values_mut() {
        group.sort_by_key(|punch| punch.timestamp);
    }

    groups
}

/// Folds one sorted group into its final row state, starting from whatever
/// row is already stored.
pub fn fold_group(current: Option<OpenRow>, group: &[RawPunch]) -> Option<OpenRow> {
    group.iter().fold(current, |state, punch| {
        merge_decision(state, punch.timestamp).apply(state)
    })
}
