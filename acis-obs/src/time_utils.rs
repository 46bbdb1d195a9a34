//! Conversion between mission-elapsed seconds and calendar date strings.
//!
//! Mission time counts TT seconds from 1998-01-01T00:00:00 TT, which is
//! 1997-12-31T23:58:56.816 UTC. Calendar strings use the day-of-year form
//! `YYYY:DDD:hh:mm:ss.sss` in UTC, so leap seconds inserted after the epoch
//! must be accounted for in both directions.

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{Result, ThermalCheckError};

/// Unix time of the mission epoch (1998-01-01T00:00:00 TT) in seconds.
pub const EPOCH_UNIX: f64 = 883_612_736.816;

/// Unix times of the first UTC instant following each leap second
/// inserted after the mission epoch.
const LEAP_SECONDS_UNIX: [f64; 6] = [
    915_148_800.0,   // 1999-01-01
    1_136_073_600.0, // 2006-01-01
    1_230_768_000.0, // 2009-01-01
    1_341_100_800.0, // 2012-07-01
    1_435_708_800.0, // 2015-07-01
    1_483_228_800.0, // 2017-01-01
];

/// Number of leap seconds elapsed at a given mission time.
fn leap_seconds_at_secs(secs: f64) -> f64 {
    let mut leaps = 0.0;
    for (i, &unix) in LEAP_SECONDS_UNIX.iter().enumerate() {
        let count = (i + 1) as f64;
        if secs >= unix - EPOCH_UNIX + count {
            leaps = count;
        } else {
            break;
        }
    }
    leaps
}

/// Number of leap seconds elapsed at a given UTC unix time.
fn leap_seconds_at_unix(unix: f64) -> f64 {
    LEAP_SECONDS_UNIX.iter().filter(|&&leap| unix >= leap).count() as f64
}

/// Convert mission seconds to a `YYYY:DDD:hh:mm:ss.sss` UTC date string.
pub fn secs_to_date(secs: f64) -> Result<String> {
    if !secs.is_finite() {
        return Err(ThermalCheckError::TimeParse(format!(
            "non-finite mission time {secs}"
        )));
    }

    let unix = EPOCH_UNIX + secs - leap_seconds_at_secs(secs);
    let millis = (unix * 1000.0).round() as i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000)
        .map_err(|e| ThermalCheckError::TimeParse(format!("{secs}: {e}")))?;

    Ok(format!(
        "{:04}:{:03}:{:02}:{:02}:{:02}.{:03}",
        dt.year(),
        dt.ordinal(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    ))
}

/// Like [`secs_to_date`], but falls back to the mission seconds themselves
/// (three decimals) when the time has no calendar representation.
pub fn secs_to_date_lossy(secs: f64) -> String {
    secs_to_date(secs).unwrap_or_else(|_| format!("{secs:.3}"))
}

/// Parse a `YYYY:DDD[:hh[:mm[:ss[.sss]]]]` UTC date string into mission seconds.
pub fn date_to_secs(date: &str) -> Result<f64> {
    let err = |reason: &str| ThermalCheckError::TimeParse(format!("{date:?}: {reason}"));

    let parts: Vec<&str> = date.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 5 {
        return Err(err("expected YYYY:DDD:hh:mm:ss.sss"));
    }

    let year: i32 = parts[0].parse().map_err(|_| err("invalid year"))?;
    let doy: u16 = parts[1].parse().map_err(|_| err("invalid day of year"))?;
    let hour: u8 = match parts.get(2) {
        Some(p) => p.parse().map_err(|_| err("invalid hour"))?,
        None => 0,
    };
    let minute: u8 = match parts.get(3) {
        Some(p) => p.parse().map_err(|_| err("invalid minute"))?,
        None => 0,
    };
    let seconds: f64 = match parts.get(4) {
        Some(p) => p.parse().map_err(|_| err("invalid seconds"))?,
        None => 0.0,
    };
    if !(0.0..60.0).contains(&seconds) {
        return Err(err("seconds out of range"));
    }

    let day = Date::from_ordinal_date(year, doy).map_err(|e| err(&e.to_string()))?;
    let clock = Time::from_hms(hour, minute, 0).map_err(|e| err(&e.to_string()))?;
    let whole_minutes = PrimitiveDateTime::new(day, clock).assume_utc();

    let unix = whole_minutes.unix_timestamp() as f64 + seconds;
    Ok(unix - EPOCH_UNIX + leap_seconds_at_unix(unix))
}

/// Accept either a calendar date string or a plain number of mission seconds.
pub fn parse_time(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(secs) => Ok(secs),
        Err(_) => date_to_secs(input),
    }
}
