//! Word-window chunking.

/// Split text into consecutive, non-overlapping windows of `chunk_size` words.
///
/// Words are separated by any Unicode whitespace and re-joined with a single
/// space. The last window may be shorter. Empty or whitespace-only input
/// yields no chunks. `chunk_size` must be at least 1; callers validate it
/// with [`docqa_core::config::validate_chunk_size`] first.
pub fn chunk_words(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    let chunks: Vec<String> = words
        .chunks(chunk_size)
        .map(|window| window.join(" "))
        .collect();

    tracing::debug!(
        "Chunked {} words into {} chunks (size: {})",
        words.len(),
        chunks.len(),
        chunk_size
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_chunk_words_thousand_words() {
        let chunks = chunk_words(&numbered_words(1000), 400);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split(' ').count(), 400);
        assert_eq!(chunks[1].split(' ').count(), 400);
        assert_eq!(chunks[2].split(' ').count(), 200);
        assert!(chunks[0].starts_with("w0 "));
        assert!(chunks[2].ends_with(" w999"));
    }

    #[test]
    fn test_chunk_count_is_ceiling() {
        for (len, size) in [(1, 1), (7, 3), (9, 3), (10, 400), (401, 400)] {
            let chunks = chunk_words(&numbered_words(len), size);
            assert_eq!(chunks.len(), len.div_ceil(size), "len={} size={}", len, size);
            assert!(chunks.iter().all(|c| c.split(' ').count() <= size));
        }
    }

    #[test]
    fn test_concatenation_preserves_words() {
        let text = "alpha  beta\tgamma\n\ndelta epsilon\u{2003}zeta eta";
        let chunks = chunk_words(text, 2);

        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
        assert_eq!(chunks[0], "alpha beta");
        assert_eq!(chunks[3], "eta");
    }

    #[test]
    fn test_chunk_words_empty() {
        assert!(chunk_words("", 400).is_empty());
        assert!(chunk_words(" \n\t  ", 400).is_empty());
    }

    #[test]
    fn test_chunk_words_utf8() {
        let chunks = chunk_words("Gamedex é um aplicativo 🎮 brasileiro", 3);
        assert_eq!(chunks, vec!["Gamedex é um", "aplicativo 🎮 brasileiro"]);
    }
}
