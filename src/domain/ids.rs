use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

const SUFFIX_LEN: usize = 4;

/// Builds a human-inspectable reference of the form
/// `<PREFIX><base36-timestamp><random-suffix>`.
///
/// Uniqueness is probabilistic; callers check the generated value against
/// the store and retry with a fresh suffix on collision.
pub fn generate_reference(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("{prefix}{}{suffix}", base36(millis))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_round_trip() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_reference_carries_prefix() {
        let now = Utc::now();
        let reference = generate_reference("DEP", now);
        assert!(reference.starts_with("DEP"));
        assert!(reference.len() > "DEP".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_references_differ_for_same_instant() {
        let now = Utc::now();
        let a = generate_reference("JE", now);
        let b = generate_reference("JE", now);
        // Same timestamp, random suffixes; a collision here is ~1 in 36^4.
        assert_ne!(a, b);
    }
}
