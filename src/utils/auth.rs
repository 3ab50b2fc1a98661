/// Compare an API key without short-circuiting on the first mismatch
///
/// Length differences still return early; only the byte content is
/// compared in constant time.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    if provided.len() != expected.len() {
        return false;
    }

    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key() {
        assert!(verify_api_key("engine-feed", "engine-feed"));
    }

    #[test]
    fn test_mismatch_and_length() {
        assert!(!verify_api_key("engine-feeD", "engine-feed"));
        assert!(!verify_api_key("engine", "engine-feed"));
        assert!(!verify_api_key("", "engine-feed"));
    }
}
