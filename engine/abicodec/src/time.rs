use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{CodecError, CodecResult};

/// Unix milliseconds of the first block slot, 2000-01-01T00:00:00.
pub const BLOCK_TIMESTAMP_EPOCH_MS: i64 = 946_684_800_000;
pub const BLOCK_INTERVAL_MS: i64 = 500;

const MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

fn from_micros(micros: i64, type_name: &str) -> CodecResult<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| CodecError::invalid(type_name, format!("{micros}us is out of range")))
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.fff…][Z]` as UTC microseconds.
fn parse_micros(text: &str, type_name: &str) -> CodecResult<i64> {
    let trimmed = text.strip_suffix('Z').unwrap_or(text);
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|err| CodecError::invalid(type_name, format!("{text:?}: {err}")))?;
    Ok(parsed.and_utc().timestamp_micros())
}

pub fn time_point_to_string(micros: i64) -> CodecResult<String> {
    let time = from_micros(micros, "time_point")?;
    let format = if micros.rem_euclid(1_000) == 0 {
        MILLIS_FORMAT
    } else {
        MICROS_FORMAT
    };
    Ok(time.format(format).to_string())
}

pub fn string_to_time_point(text: &str) -> CodecResult<i64> {
    parse_micros(text, "time_point")
}

pub fn time_point_sec_to_string(secs: u32) -> CodecResult<String> {
    time_point_to_string(secs as i64 * 1_000_000)
}

/// Sub-second digits are dropped.
pub fn string_to_time_point_sec(text: &str) -> CodecResult<u32> {
    let secs = parse_micros(text, "time_point_sec")?.div_euclid(1_000_000);
    u32::try_from(secs)
        .map_err(|_| CodecError::invalid("time_point_sec", format!("{text:?} is out of range")))
}

pub fn block_timestamp_to_string(slot: u32) -> CodecResult<String> {
    let ms = slot as i64 * BLOCK_INTERVAL_MS + BLOCK_TIMESTAMP_EPOCH_MS;
    time_point_to_string(ms * 1_000)
}

/// Rounds down to the enclosing half-second slot.
pub fn string_to_block_timestamp(text: &str) -> CodecResult<u32> {
    let ms = parse_micros(text, "block_timestamp_type")?.div_euclid(1_000);
    let slot = (ms - BLOCK_TIMESTAMP_EPOCH_MS).div_euclid(BLOCK_INTERVAL_MS);
    u32::try_from(slot).map_err(|_| {
        CodecError::invalid("block_timestamp_type", format!("{text:?} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_point_sec_known_value() {
        assert_eq!(
            time_point_sec_to_string(0x5C75_8616).expect("render"),
            "2019-02-26T18:31:50.000"
        );
        assert_eq!(
            string_to_time_point_sec("2019-02-26T18:31:50.000"),
            Ok(0x5C75_8616)
        );
        assert_eq!(string_to_time_point_sec("2019-02-26T18:31:50"), Ok(0x5C75_8616));
        assert!(string_to_time_point_sec("1969-12-31T23:59:59").is_err());
    }

    #[test]
    fn time_point_precision() {
        assert_eq!(time_point_to_string(1_500).expect("render"), "1970-01-01T00:00:00.001500");
        assert_eq!(time_point_to_string(-1_000).expect("render"), "1969-12-31T23:59:59.999");
        assert_eq!(string_to_time_point("1970-01-01T00:00:00.001500"), Ok(1_500));
        assert_eq!(string_to_time_point("1970-01-01T00:00:01Z"), Ok(1_000_000));
        assert!(string_to_time_point("yesterday").is_err());
    }

    #[test]
    fn block_timestamp_slots() {
        assert_eq!(block_timestamp_to_string(0).expect("render"), "2000-01-01T00:00:00.000");
        assert_eq!(
            string_to_block_timestamp("2020-01-01T00:00:00.500"),
            Ok(1_262_304_001)
        );
        assert_eq!(
            block_timestamp_to_string(1_262_304_001).expect("render"),
            "2020-01-01T00:00:00.500"
        );
    }
}
