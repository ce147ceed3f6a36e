use chrono::{NaiveDate, NaiveTime};

use super::ledger::CheckpointLedger;
use super::phase::CHECKPOINT_CAPACITY;

pub const DURATION_PLACEHOLDER: &str = "--:--";

/// Wall-clock format used both when stamping records and when parsing
/// them back for the duration math.
pub const TIME_FORMAT: &str = "%H:%M:%S";

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Total worked time across the four checkpoints, formatted as
/// `"{h}h {m}m {s}s"`, or the placeholder until all four exist.
///
/// Each time-of-day string is anchored to 1970-01-01 UTC purely to get a
/// subtractable instant. All four stamps are assumed to fall on the same
/// calendar day; a shift that crosses midnight comes out wrong (possibly
/// negative).
pub fn worked_duration(ledger: &CheckpointLedger) -> String {
    if ledger.len() < CHECKPOINT_CAPACITY {
        return DURATION_PLACEHOLDER.to_string();
    }

    let mut instants = [0i64; CHECKPOINT_CAPACITY];
    for (slot, record) in instants.iter_mut().zip(ledger.records()) {
        match time_of_day_ms(&record.timestamp) {
            Some(ms) => *slot = ms,
            None => return DURATION_PLACEHOLDER.to_string(),
        }
    }

    let [clock_in, break_start, break_end, clock_out] = instants;
    // Worked = (break-end - clock-in) + (clock-out - break-start), which
    // equals total span minus the break span.
    let worked_ms = (break_end - clock_in) + (clock_out - break_start);

    format_worked_ms(worked_ms)
}

fn time_of_day_ms(raw: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()?;
    let anchored = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time);
    Some(anchored.and_utc().timestamp_millis())
}

fn format_worked_ms(worked_ms: i64) -> String {
    let hours = worked_ms / MS_PER_HOUR;
    let minutes = (worked_ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (worked_ms % MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{hours}h {minutes}m {seconds}s")
}
