//! Presentation helpers
//!
//! Masking happens here, at the display boundary; the store and dispatcher
//! never produce masked or partial key material themselves.

/// Mask a decrypted key for display: first four and last four characters
///
/// Keys too short to have a hidden middle are fully masked.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "********".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_long_key() {
        assert_eq!(mask_key("AIzaSyExampleKey1234"), "AIza...1234");
    }

    #[test]
    fn test_mask_hides_middle() {
        let masked = mask_key("abcdEFGHIJKLmnop");
        assert!(!masked.contains("EFGHIJKL"));
    }

    #[test]
    fn test_short_key_fully_masked() {
        assert_eq!(mask_key("tiny"), "********");
        assert_eq!(mask_key("12345678"), "********");
    }

    #[test]
    fn test_multibyte_key_does_not_panic() {
        let masked = mask_key("ключключключ");
        assert_eq!(masked, "ключ...ключ");
    }
}
