use chrono::{Local, NaiveDateTime};
use std::time::SystemTime;

/// Service center timestamp layout: day, month, two-digit year, 24h time.
pub const SCTS_FORMAT: &str = "%d%m%y%H%M%S";

/// Returns the current unix timestamp (seconds elapsed since 1970-01-01).
#[inline]
pub fn timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("System clock is set before the unix epoch")
        .as_secs()
}

/// Current wall-clock service center timestamp.
#[inline]
pub fn scts_now() -> String {
    Local::now().format(SCTS_FORMAT).to_string()
}

pub fn parse_scts(scts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(scts, SCTS_FORMAT).ok()
}

pub fn format_scts(time: &NaiveDateTime) -> String {
    time.format(SCTS_FORMAT).to_string()
}

/// Long-form rendering used in human-readable notification texts.
pub fn format_long(time: &NaiveDateTime) -> String {
    format!("{} +0000 UTC", time.format("%Y-%m-%d %H:%M:%S"))
}

/// Current wall clock in display form, for message-log entries.
pub fn now_display() -> String {
    Local::now().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scts_roundtrip() {
        let parsed = parse_scts("020106150405").unwrap();
        assert_eq!(format_scts(&parsed), "020106150405");
    }

    #[test]
    fn test_scts_now_shape() {
        let scts = scts_now();
        assert_eq!(scts.len(), 12);
        assert!(scts.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_parse_scts_rejects_garbage() {
        assert!(parse_scts("not-a-stamp").is_none());
        assert!(parse_scts("0201061504").is_none());
    }

    #[test]
    fn test_format_long() {
        let parsed = parse_scts("020106150407").unwrap();
        assert_eq!(format_long(&parsed), "2006-01-02 15:04:07 +0000 UTC");
    }
}
