use serde_json::Value;

use crate::parser::patterns::BATTLE_TIME;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse an exported battle duration into seconds.
/// Format: `+DDDDDDDD.HH:MM:SS.ffffff` (the day prefix is optional).
/// The first three fractional digits are read as a millisecond count as
/// written, so `.123999` is 123 ms and a short `.5` is 5 ms.
/// Returns 0.0 when the string doesn't match.
pub fn parse_battle_time(s: &str) -> f64 {
    let Some(caps) = BATTLE_TIME.captures(s) else {
        return 0.0;
    };

    let days: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|d| d as f64)
        .unwrap_or(0.0);
    let hours: f64 = caps[2].parse::<u32>().map(f64::from).unwrap_or(0.0);
    let minutes: f64 = caps[3].parse::<u32>().map(f64::from).unwrap_or(0.0);
    let seconds: f64 = caps[4].parse::<u32>().map(f64::from).unwrap_or(0.0);

    let fraction = &caps[5];
    let millis_digits: String = fraction.chars().take(3).collect();
    let millis: f64 = millis_digits.parse::<u32>().map(f64::from).unwrap_or(0.0);

    days * SECONDS_PER_DAY + hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0
}

/// Read a `battleTime` JSON value: duration strings are parsed, bare numbers
/// are taken as seconds already.
pub fn battle_time_value(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_battle_time(s),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Format seconds as `M:SS`. Minutes are not wrapped into hours.
pub fn format_battle_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
