/// Returns at most the last `max_bytes` bytes of `s`, cut on a char boundary.
pub fn tail(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut start = s.len() - max_bytes;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_short_input_untouched() {
        assert_eq!(tail("abc", 10), "abc");
    }

    #[test]
    fn test_tail_keeps_end() {
        assert_eq!(tail("hello world", 5), "world");
    }

    #[test]
    fn test_tail_respects_char_boundary() {
        // "é" is two bytes; a 3 byte tail would split it
        assert_eq!(tail("aéb", 2), "b");
        assert_eq!(tail("aéb", 3), "éb");
    }
}
