//! Short public identifiers for games, forms and lesson groups.

use rand::Rng;
use rand::distributions::Alphanumeric;

const UID_LEN: usize = 12;

/// Random lowercase alphanumeric identifier, used in URLs handed to students.
pub fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_shape() {
        let uid = generate_uid();
        assert_eq!(uid.len(), UID_LEN);
        assert!(uid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_uids_differ() {
        assert_ne!(generate_uid(), generate_uid());
    }
}
