//! Convenience patient IDs: `PAT` + the last six digits of the current
//! Unix time in milliseconds. Two IDs generated within the same
//! millisecond (or 1000 s apart) collide; callers must not treat them as
//! identities.

use chrono::Utc;

pub const PATIENT_ID_PREFIX: &str = "PAT";

const SUFFIX_MODULUS: i64 = 1_000_000;

/// Generate an ID from the wall clock.
pub fn generate() -> String {
    from_millis(Utc::now().timestamp_millis())
}

/// Generate an ID from a given millisecond timestamp.
pub fn from_millis(millis: i64) -> String {
    format!("{PATIENT_ID_PREFIX}{:06}", millis.rem_euclid(SUFFIX_MODULUS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_last_six_digits() {
        assert_eq!(from_millis(1_718_000_123_456), "PAT123456");
        assert_eq!(from_millis(1_718_000_000_042), "PAT000042");
    }

    #[test]
    fn generated_id_shape() {
        let id = generate();
        assert!(id.starts_with(PATIENT_ID_PREFIX));
        assert_eq!(id.len(), PATIENT_ID_PREFIX.len() + 6);
        assert!(id[PATIENT_ID_PREFIX.len()..].chars().all(|c| c.is_ascii_digit()));
    }
}
