use chrono::{DateTime, Utc};

/// `Wed Aug 27 13:08:45 +0000 2008`, used by the REST endpoints.
const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse a date as sent by the REST endpoints, falling back to RFC 2822 which the search endpoint uses.
pub fn parse_twitter_date(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(date, TWITTER_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc2822(date))
        .map(|dt| dt.to_utc())
        .ok()
}

pub fn is_screen_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= crate::consts::SCREEN_NAME_MAX_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
