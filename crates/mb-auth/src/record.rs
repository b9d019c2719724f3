//! Whitelist record layout shared by every backend.
//!
//! ```text
//!   -8 bytes-    --n bytes--
//!   issued_at  + token (JSON)
//! ```
//!
//! The issue time is a big-endian Unix timestamp so the reaper can judge an
//! entry's age from its first eight bytes without deserializing the token.
use super::*;
use byteorder::BigEndian;
use byteorder::ByteOrder;
use mb_core::STAMP_WIDTH;
use std::time::Duration;

pub fn encode(token: &Token) -> Result<Vec<u8>, StoreError> {
    let issued = u64::try_from(token.issued()).map_err(|_| StoreError::NegativeTime)?;
    let mut value = vec![0u8; STAMP_WIDTH];
    BigEndian::write_u64(&mut value, issued);
    serde_json::to_writer(&mut value, token)?;
    Ok(value)
}

pub fn decode(value: &[u8]) -> Result<Token, StoreError> {
    let body = value
        .get(STAMP_WIDTH..)
        .ok_or(StoreError::Truncated(value.len()))?;
    Ok(serde_json::from_slice(body)?)
}

/// Reads only the issue-time prefix.
pub fn stamp(value: &[u8]) -> Result<i64, StoreError> {
    value
        .get(..STAMP_WIDTH)
        .map(BigEndian::read_u64)
        .map(|issued| issued as i64)
        .ok_or(StoreError::Truncated(value.len()))
}

/// True once the entry is strictly older than `max_age` at `now`.
pub fn stale(value: &[u8], now: i64, max_age: Duration) -> Result<bool, StoreError> {
    let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    Ok(now.saturating_sub(stamp(value)?) > max_age)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(issued: i64) -> Token {
        Token::new("monban", "subject", "csrf", issued, Duration::from_secs(60))
            .identified("123".to_string())
    }

    #[test]
    fn prefix_is_big_endian_issue_time() {
        let value = encode(&token(0x0102030405060708)).unwrap();
        assert_eq!(&value[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(stamp(&value).unwrap(), 0x0102030405060708);
    }

    #[test]
    fn body_is_the_serialized_token() {
        let original = token(1_700_000_000);
        let value = encode(&original).unwrap();
        let decoded = decode(&value).unwrap();
        assert!(decoded.matches(&original));
        let body: serde_json::Value = serde_json::from_slice(&value[8..]).unwrap();
        assert_eq!(body["id"], "123");
    }

    #[test]
    fn stamp_ignores_the_body() {
        let mut value = encode(&token(42)).unwrap();
        value.truncate(8);
        assert_eq!(stamp(&value).unwrap(), 42);
        assert!(decode(&value).is_err());
    }

    #[test]
    fn negative_issue_times_are_refused() {
        assert!(matches!(encode(&token(-1)), Err(StoreError::NegativeTime)));
    }

    #[test]
    fn short_records_are_truncated() {
        assert!(matches!(stamp(&[0, 1, 2]), Err(StoreError::Truncated(3))));
        assert!(matches!(decode(&[0, 1, 2]), Err(StoreError::Truncated(3))));
    }

    #[test]
    fn staleness_is_strict() {
        let max = Duration::from_secs(100);
        let value = encode(&token(1_000)).unwrap();
        assert!(!stale(&value, 1_000, max).unwrap());
        assert!(!stale(&value, 1_100, max).unwrap());
        assert!(stale(&value, 1_101, max).unwrap());
    }

    #[test]
    fn unbounded_ages_never_go_stale() {
        let value = encode(&token(0)).unwrap();
        assert!(!stale(&value, i64::MAX, Duration::from_secs(u64::MAX)).unwrap());
    }
}
