//! Random identifier generation.

use rand::{Rng, distributions::Alphanumeric};

/// Length of identifiers handed out when a provider id slot is released
pub const RELEASED_INTERNAL_ID_LEN: usize = 10;

/// Generates a random ASCII alphanumeric identifier of `len` characters
pub fn make_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        let id = make_id(RELEASED_INTERNAL_ID_LEN);
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn successive_ids_differ() {
        assert_ne!(make_id(16), make_id(16));
    }
}
