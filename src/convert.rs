//! Text to typed-value conversion.
//!
//! [`convert`] is the single entry point. It dispatches on the target [`Kind`]
//! and recurses for sequences. It never touches shared state.

use std::fmt::Write;
use std::time::Duration;

use chrono::TimeDelta;

use crate::error::{ConfigError, ValueParseError};
use crate::types::{Kind, Value};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Convert `text` into a value of `kind`.
///
/// Sequences split on `,` and convert every piece, empty pieces included.
/// One bad element fails the whole sequence.
pub fn convert(text: &str, kind: &Kind) -> Result<Value, ConfigError> {
    match kind {
        Kind::Duration => Ok(Value::Duration(parse_duration(text)?)),
        Kind::SignedDuration => Ok(Value::SignedDuration(parse_signed_duration(text)?)),
        Kind::Bool => Ok(Value::Bool(parse_bool(text)?)),
        Kind::Seq(elem) => text
            .split(',')
            .map(|piece| convert(piece, elem))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq),
        Kind::Str => Ok(Value::Str(text.to_string())),
        Kind::Int(bits) => Ok(Value::Int(parse_signed(text, *bits)?)),
        Kind::Uint(bits) => Ok(Value::Uint(parse_unsigned(text, *bits)?)),
        Kind::Float(bits) => Ok(Value::Float(parse_float(text, *bits)?)),
        Kind::Unsupported(name) => Err(ConfigError::InvalidTypeForDefaultValues {
            type_name: (*name).to_string(),
        }),
    }
}

fn parse_bool(text: &str) -> Result<bool, ValueParseError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueParseError::Bool(text.to_string())),
    }
}

fn parse_signed(text: &str, bits: u32) -> Result<i64, ValueParseError> {
    let parsed = match bits {
        8 => text.parse::<i8>().map(i64::from),
        16 => text.parse::<i16>().map(i64::from),
        32 => text.parse::<i32>().map(i64::from),
        _ => text.parse::<i64>(),
    };
    parsed.map_err(|source| ValueParseError::Int {
        input: text.to_string(),
        source,
    })
}

fn parse_unsigned(text: &str, bits: u32) -> Result<u64, ValueParseError> {
    let parsed = match bits {
        8 => text.parse::<u8>().map(u64::from),
        16 => text.parse::<u16>().map(u64::from),
        32 => text.parse::<u32>().map(u64::from),
        _ => text.parse::<u64>(),
    };
    parsed.map_err(|source| ValueParseError::Int {
        input: text.to_string(),
        source,
    })
}

fn parse_float(text: &str, bits: u32) -> Result<f64, ValueParseError> {
    let parsed = if bits == 32 {
        text.parse::<f32>().map(f64::from)
    } else {
        text.parse::<f64>()
    };
    let value = parsed.map_err(|source| ValueParseError::Float {
        input: text.to_string(),
        source,
    })?;

    // Rust saturates overflowing literals to infinity instead of failing.
    if value.is_infinite() && !is_infinity_literal(text) {
        return Err(ValueParseError::FloatRange {
            input: text.to_string(),
            bits,
        });
    }
    Ok(value)
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse a duration literal such as `300ms`, `1.5h` or `2h45m`.
///
/// Units: `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`. A bare `0` is
/// accepted. Negative values are rejected since `Duration` is unsigned; use
/// [`parse_signed_duration`] for those.
pub fn parse_duration(text: &str) -> Result<Duration, ValueParseError> {
    let (negative, total) = parse_nanos(text)?;
    if negative && total != 0 {
        return Err(duration_error(text, "negative durations are not supported"));
    }
    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| duration_error(text, "value out of range"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Parse a duration literal that may carry a leading `-`, e.g. `-1m30s`.
///
/// The range is that of a signed 64-bit nanosecond count, about ±292 years.
pub fn parse_signed_duration(text: &str) -> Result<TimeDelta, ValueParseError> {
    let (negative, total) = parse_nanos(text)?;
    let signed = if negative {
        -i128::try_from(total).map_err(|_| duration_error(text, "value out of range"))?
    } else {
        i128::try_from(total).map_err(|_| duration_error(text, "value out of range"))?
    };
    let nanos = i64::try_from(signed).map_err(|_| duration_error(text, "value out of range"))?;
    Ok(TimeDelta::nanoseconds(nanos))
}

fn duration_error(text: &str, reason: &'static str) -> ValueParseError {
    ValueParseError::Duration {
        input: text.to_string(),
        reason,
    }
}

/// Sign and magnitude in nanoseconds.
fn parse_nanos(text: &str) -> Result<(bool, u128), ValueParseError> {
    let invalid = |reason| duration_error(text, reason);

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Ok((negative, 0));
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);
        rest = after_int;

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("value out of range"))?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or_else(|| invalid("value out of range"))?;

        // Digits beyond nanosecond precision of the largest unit can't matter.
        let mut numerator: u128 = 0;
        let mut denominator: u128 = 1;
        for digit in frac_part.bytes().take(24) {
            numerator = numerator * 10 + u128::from(digit - b'0');
            denominator *= 10;
        }
        nanos = nanos
            .checked_add(numerator * scale / denominator)
            .ok_or_else(|| invalid("value out of range"))?;

        total = total
            .checked_add(nanos)
            .ok_or_else(|| invalid("value out of range"))?;
    }
    Ok((negative, total))
}

/// Render a duration in the form [`parse_duration`] reads back, e.g.
/// `1h30m0s`, `2.5s`, `150ms`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SEC {
        let (scale, unit) = if nanos < 1_000 {
            (1, "ns")
        } else if nanos < 1_000_000 {
            (1_000, "µs")
        } else {
            (1_000_000, "ms")
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let secs = duration.as_secs();
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let second_nanos = u128::from(secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos());

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", decimal(second_nanos, NANOS_PER_SEC));
    out
}

/// Render a signed duration in the form [`parse_signed_duration`] reads
/// back, e.g. `-1m30s`.
pub fn format_signed_duration(delta: TimeDelta) -> String {
    let magnitude = format_duration(delta.abs().to_std().unwrap_or_default());
    if delta < TimeDelta::zero() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
