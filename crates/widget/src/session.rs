//! Visitor session ids
//!
//! One id per widget instance: `session_{unix_millis}_{9 base-36 chars}`.

use rand::Rng;
use time::OffsetDateTime;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Fresh session id for the current instant
pub fn new_session_id() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    session_id_at(millis, &mut rand::thread_rng())
}

pub fn session_id_at<R: Rng>(unix_millis: i128, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{}_{}", unix_millis, suffix)
}

/// Whether `id` has the shape produced by [`new_session_id`]
pub fn is_generated_session_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("session_") else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| BASE36.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id();
        assert!(is_generated_session_id(&id), "unexpected id {id}");
    }

    #[test]
    fn test_session_id_at_is_deterministic_for_seeded_rng() {
        let a = session_id_at(1_700_000_000_000, &mut StdRng::seed_from_u64(7));
        let b = session_id_at(1_700_000_000_000, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.starts_with("session_1700000000000_"));
        assert_eq!(a.len(), "session_1700000000000_".len() + 9);
    }

    #[test]
    fn test_rejects_foreign_ids() {
        assert!(!is_generated_session_id("session_abc_123456789"));
        assert!(!is_generated_session_id("session_1700000000000_SHORT"));
        assert!(!is_generated_session_id("visitor-42"));
    }
}
