//! Address syntax validation.

/// Basic address validation.
///
/// Accepts `local@domain` where neither side contains whitespace or a second
/// `@`, and the domain has a `.` with at least one character on each side.
/// This is a shape check, not RFC 5322.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }

    // Must contain exactly one @
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot in the domain must have text on both sides
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address() {
        assert!(is_valid_address("user@example.com"));
        assert!(is_valid_address("user.name+tag@sub.example.com"));
        assert!(is_valid_address("a@b.c"));
        assert!(is_valid_address("a@b..c"));
    }

    #[test]
    fn test_invalid_address() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("not-an-email"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address("user@"));
        assert!(!is_valid_address("user@example"));
        assert!(!is_valid_address("user@@example.com"));
        assert!(!is_valid_address("user@.com"));
        assert!(!is_valid_address("user@example."));
        assert!(!is_valid_address("us er@example.com"));
        assert!(!is_valid_address("a@b@c.com"));
    }
}
