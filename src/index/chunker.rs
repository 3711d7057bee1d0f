/// Split text into fixed-size chunks with a fixed overlap, both measured in
/// characters. Slices always fall on UTF-8 character boundaries and chunks
/// keep source order.
///
/// With step = chunk_size - overlap, dropping the first `overlap` characters
/// of every chunk after the first reconstructs the input exactly.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // Byte offset of every character boundary, including the end of the text
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total_chars {
        let end = (start + chunk_size).min(total_chars);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == total_chars {
            break;
        }
        let step = chunk_size.saturating_sub(overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_text("hello world", 100, 20);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("", 100, 20).is_empty());
    }

    #[test]
    fn consecutive_chunks_overlap_by_the_configured_amount() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let chunks = split_text(&text, 50, 10);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(pair[0].chars().count() - 10).collect();
            let head: String = pair[1].chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn dropping_overlaps_reconstructs_the_source() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let overlap = 25;
        let chunks = split_text(&text, 120, overlap);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text = "día señal año ".repeat(100);
        let chunks = split_text(&text, 37, 9);
        let rebuilt: String = {
            let mut acc = chunks[0].clone();
            for chunk in &chunks[1..] {
                acc.extend(chunk.chars().skip(9));
            }
            acc
        };
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunk_size_bounds_every_chunk() {
        let text = "x".repeat(5000);
        for chunk in split_text(&text, 1000, 200) {
            assert!(chunk.chars().count() <= 1000);
        }
    }
}
