use chrono::{NaiveDate, NaiveTime};

use crate::error::{HmsError, HmsResult};
use super::types::TimeSlot;

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Converts minutes since midnight back to a clock time
pub fn minutes_to_time(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/// Parses a date in YYYY-MM-DD form
pub fn parse_date(date_str: &str) -> HmsResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|_| HmsError::validation(format!("invalid date '{}', expected YYYY-MM-DD", date_str.trim())))
}

/// Parses a date and an HH:MM time into a slot
pub fn parse_slot(date_str: &str, time_str: &str) -> HmsResult<TimeSlot> {
    let date = parse_date(date_str)?;
    let time = parse_time_to_minutes(time_str)
        .and_then(minutes_to_time)
        .ok_or_else(|| HmsError::validation(format!("invalid time '{}', expected HH:MM", time_str.trim())))?;
    Ok(TimeSlot::new(date, time))
}

/// Expands a working window into slots on one date.
/// Slot 1 = start, each following slot = previous + interval, stopping
/// before `end`. The window may not wrap past midnight.
pub fn day_slots(date: NaiveDate, start: &str, end: &str, interval_minutes: u32) -> HmsResult<Vec<TimeSlot>> {
    if interval_minutes == 0 {
        return Err(HmsError::validation("slot interval must be at least 1 minute"));
    }
    let start_minutes = parse_time_to_minutes(start)
        .ok_or_else(|| HmsError::validation(format!("invalid start time '{}'", start)))?;
    let end_minutes = parse_time_to_minutes(end)
        .ok_or_else(|| HmsError::validation(format!("invalid end time '{}'", end)))?;
    if end_minutes <= start_minutes {
        return Err(HmsError::validation(format!(
            "end time {} must be after start time {}",
            end, start
        )));
    }

    let mut slots = Vec::new();
    let mut current_minutes = start_minutes;
    while current_minutes < end_minutes {
        if let Some(time) = minutes_to_time(current_minutes) {
            slots.push(TimeSlot::new(date, time));
        }
        current_minutes += interval_minutes;
    }
    Ok(slots)
}
