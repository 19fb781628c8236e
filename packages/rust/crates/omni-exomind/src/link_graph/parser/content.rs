use std::path::Path;

/// Read a note permissively: invalid UTF-8 is replaced and I/O failures
/// degrade to empty text so one bad file never aborts a scan.
pub(crate) fn read_note_text(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read note; indexing as empty");
            String::new()
        }
    }
}

/// First `# ` heading (trimmed), else `fallback`.
pub(crate) fn extract_title(text: &str, fallback: &str) -> String {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map_or_else(|| fallback.to_string(), |rest| rest.trim().to_string())
}

/// First `max_chars` characters of `text`.
pub(crate) fn content_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_uses_first_h1() {
        let text = "intro\n## Sub\n#NoSpace\n#  Real Title  \n# Second\n";
        assert_eq!(extract_title(text, "stem"), "Real Title");
    }

    #[test]
    fn test_extract_title_falls_back_to_stem() {
        assert_eq!(extract_title("no heading here\n## only h2", "my-note"), "my-note");
        assert_eq!(extract_title("", "empty"), "empty");
    }

    #[test]
    fn test_extract_title_handles_crlf() {
        assert_eq!(extract_title("# Windows\r\nbody", "x"), "Windows");
    }

    #[test]
    fn test_content_snippet_counts_characters() {
        assert_eq!(content_snippet("héllo wörld", 5), "héllo");
        assert_eq!(content_snippet("short", 8000), "short");
        assert_eq!(content_snippet("abc", 0), "");
    }
}
