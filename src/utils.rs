const MASK_PREFIX_CHARS: usize = 10;
const MASK_SUFFIX_CHARS: usize = 4;

/// Renders a token as its first 10 and last 4 characters around an ellipsis.
///
/// Tokens shorter than 14 characters are replaced by one `*` per character so
/// that the prefix and suffix never overlap and expose the whole value.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < MASK_PREFIX_CHARS + MASK_SUFFIX_CHARS {
        return "*".repeat(chars.len());
    }

    let prefix: String = chars[..MASK_PREFIX_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - MASK_SUFFIX_CHARS..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
