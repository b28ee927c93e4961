/// Truncates `content` to at most `max_bytes` UTF-8 bytes, backing off
/// to the nearest valid char boundary, and appends a trailing ellipsis
/// marker when truncation actually occurred.
pub fn truncate_utf8(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n...(消息过长已截断)", &content[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_untouched() {
        assert_eq!(truncate_utf8("hello", 100), "hello");
    }

    #[test]
    fn truncation_falls_back_to_char_boundary() {
        let content = "你好世界".repeat(10);
        let truncated = truncate_utf8(&content, 10);
        assert!(truncated.starts_with("你好"));
        assert!(truncated.contains("截断"));
    }
}
