use crate::core::error::Error;

/// bcrypt with a fresh random salt per call.
pub(crate) fn hash(plaintext: &str, cost: u32) -> Result<String, Error> {
    bcrypt::hash(plaintext, cost).map_err(Error::CorruptCredential)
}

/// `Ok(false)` on mismatch; a hash that can't be parsed is an error.
pub(crate) fn matches(hash: &str, plaintext: &str) -> Result<bool, Error> {
    bcrypt::verify(plaintext, hash).map_err(Error::CorruptCredential)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[test]
    fn test_hash_and_match() {
        let hash = hash("my-secure-password", COST).unwrap();

        assert!(matches(&hash, "my-secure-password").unwrap());
        assert!(!matches(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash("same-password", COST).unwrap();
        let second = hash("same-password", COST).unwrap();

        assert_ne!(first, second);
        assert!(matches(&first, "same-password").unwrap());
        assert!(matches(&second, "same-password").unwrap());
    }

    #[test]
    fn test_corrupt_hash() {
        assert!(matches!(
            matches("not-a-bcrypt-hash", "pw1"),
            Err(Error::CorruptCredential(_))
        ));
    }
}
