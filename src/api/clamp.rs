use tracing::debug;

use crate::core::CompoundingFrequency;

// Ceilings keep every closed form finite: (1 + 1/365)^(365*100) is about
// 2.3e43, times MAX_MONEY stays far below f64::MAX.
pub const MAX_MONEY: f64 = 1e12;
pub const MAX_RATE_PERCENT: f64 = 100.0;
pub const MAX_YEARS: u32 = 100;
pub const MAX_MONTHS: u32 = MAX_YEARS * 12;
pub const MIN_CALENDAR_YEAR: i32 = 1900;
pub const MAX_CALENDAR_YEAR: i32 = 2200;

pub fn money(field: &str, raw: Option<f64>, default: f64) -> f64 {
    let Some(value) = raw else {
        return default;
    };
    if !value.is_finite() || value < 0.0 {
        clamped(field, value, 0.0)
    } else if value > MAX_MONEY {
        clamped(field, value, MAX_MONEY)
    } else {
        value
    }
}

// Percent in, fraction out.
pub fn rate_percent(field: &str, raw: Option<f64>, default_percent: f64) -> f64 {
    let value = raw.unwrap_or(default_percent);
    let percent = if !value.is_finite() || value < 0.0 {
        clamped(field, value, 0.0)
    } else if value > MAX_RATE_PERCENT {
        clamped(field, value, MAX_RATE_PERCENT)
    } else {
        value
    };
    percent / 100.0
}

pub fn optional_rate_percent(field: &str, raw: Option<f64>) -> Option<f64> {
    raw.map(|value| rate_percent(field, Some(value), 0.0))
}

pub fn whole_number(field: &str, raw: Option<f64>, default: u32, min: u32, max: u32) -> u32 {
    let Some(value) = raw else {
        return default;
    };
    if !value.is_finite() {
        return clamped(field, value, min as f64) as u32;
    }
    let floored = value.floor();
    if floored < min as f64 {
        clamped(field, value, min as f64) as u32
    } else if floored > max as f64 {
        clamped(field, value, max as f64) as u32
    } else {
        floored as u32
    }
}

// A payment stream may run at most MAX_YEARS whatever its frequency.
pub fn max_periods(frequency: CompoundingFrequency) -> u32 {
    MAX_YEARS * frequency.periods_per_year()
}

pub fn bounded(field: &str, raw: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    let Some(value) = raw else {
        return default;
    };
    if !value.is_finite() || value < min {
        clamped(field, value, min)
    } else if value > max {
        clamped(field, value, max)
    } else {
        value
    }
}

pub fn calendar_year(field: &str, raw: Option<f64>, default: i32) -> i32 {
    let Some(value) = raw else {
        return default;
    };
    if !value.is_finite() {
        return clamped(field, value, default as f64) as i32;
    }
    let floored = value.floor();
    if floored < MIN_CALENDAR_YEAR as f64 {
        clamped(field, value, MIN_CALENDAR_YEAR as f64) as i32
    } else if floored > MAX_CALENDAR_YEAR as f64 {
        clamped(field, value, MAX_CALENDAR_YEAR as f64) as i32
    } else {
        floored as i32
    }
}

fn clamped(field: &str, raw: f64, to: f64) -> f64 {
    debug!(field, raw, clamped_to = to, "clamped calculator input");
    to
}
