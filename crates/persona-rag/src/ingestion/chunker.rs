//! Recursive character chunking with overlap
//!
//! Splits raw text into ~1000-character chunks with 200 characters of
//! overlap between neighbors. Break points prefer paragraph breaks,
//! then line breaks, then sentence ends, then word boundaries before
//! falling back to a hard character cut, so semantic units survive
//! chunking when avoidable. Same input always yields the same chunks.

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Chunk, SourceDocument};

/// Text chunker with configurable size and overlap
pub struct RecursiveChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl RecursiveChunker {
    /// Create a new chunker. The overlap must be smaller than half of
    /// the chunk size so consecutive chunks always make forward
    /// progress.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        assert!(
            overlap < chunk_size / 2,
            "overlap must be less than half the chunk size"
        );
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Chunk several documents, preserving document order.
    pub fn chunk_documents(&self, documents: &[(String, SourceDocument)]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|(text, source)| self.chunk(text, *source))
            .collect()
    }

    /// Chunk one document into overlapping slices covering the whole
    /// text. Chunks are exact substrings of the input, and sizes are
    /// measured in characters, not bytes.
    pub fn chunk(&self, text: &str, source: SourceDocument) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < text.len() {
            let hard_end = advance_chars(text, start, self.chunk_size);
            if hard_end == text.len() {
                chunks.push(Chunk::new(&text[start..], source));
                break;
            }

            let end = self.break_point(text, start, hard_end);
            chunks.push(Chunk::new(&text[start..end], source));

            // Next chunk starts `overlap` characters before this one
            // ended.
            let mut next = retreat_chars(text, end, self.overlap);
            if next <= start {
                next = end;
            }
            start = next;
        }

        chunks
    }

    /// Find the best break point in `(floor, hard_end]` where `floor`
    /// is half a chunk past `start`. Preference order: paragraph
    /// break, line break, sentence end, word boundary, hard cut.
    fn break_point(&self, text: &str, start: usize, hard_end: usize) -> usize {
        let floor = advance_chars(text, start, self.chunk_size / 2);
        let window = &text[floor..hard_end];

        if let Some(pos) = window.rfind("\n\n") {
            return floor + pos + 2;
        }
        if let Some(pos) = window.rfind('\n') {
            return floor + pos + 1;
        }
        if let Some(end) = last_sentence_end(text, start, floor, hard_end) {
            return end;
        }
        if let Some(pos) = window.rfind(' ') {
            return floor + pos + 1;
        }

        hard_end
    }
}

/// Last sentence boundary strictly inside `(floor, hard_end)`, if any.
fn last_sentence_end(text: &str, start: usize, floor: usize, hard_end: usize) -> Option<usize> {
    let mut best = None;
    let mut offset = start;
    for sentence in text[start..hard_end].split_sentence_bounds() {
        offset += sentence.len();
        // The final bound always equals hard_end and is not a real
        // sentence end there, so require a strict inequality.
        if offset >= floor && offset < hard_end {
            best = Some(offset);
        }
    }
    best
}

/// Byte offset `count` characters forward of `from`, clamped to the
/// end of the text. `from` must be a char boundary.
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Byte offset `count` characters back from `from`, clamped to the
/// start of the text. `from` must be a char boundary.
fn retreat_chars(text: &str, from: usize, count: usize) -> usize {
    let mut offset = from;
    for _ in 0..count {
        match text[..offset].char_indices().next_back() {
            Some((i, _)) => offset = i,
            None => break,
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!(
                "Paragraph {} covers a distinct chapter of the career story. \
                 It mentions project number {} and outcome metric {}. \
                 The work spanned several quarters and teams.\n\n",
                i,
                i * 7,
                i * 13
            ));
        }
        text
    }

    /// Reconstruct the source by merging chunks on their overlaps.
    fn reconstruct(chunks: &[Chunk], max_overlap: usize) -> String {
        let mut out = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            let limit = max_overlap.min(chunk.text.len()).min(out.len());
            let mut merged = false;
            for o in (0..=limit).rev() {
                if out.ends_with(&chunk.text[..o]) {
                    out.push_str(&chunk.text[o..]);
                    merged = true;
                    break;
                }
            }
            assert!(merged, "chunk does not continue the previous one");
        }
        out
    }

    #[test]
    fn chunks_cover_full_text_with_bounded_overlap() {
        let text = sample_text();
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk(&text, SourceDocument::Resume);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
        assert_eq!(reconstruct(&chunks, 200), text);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = sample_text();
        let chunker = RecursiveChunker::new(1000, 200);
        let a = chunker.chunk(&text, SourceDocument::Resume);
        let b = chunker.chunk(&text, SourceDocument::Resume);
        assert_eq!(a, b);
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let text = sample_text();
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk(&text, SourceDocument::Resume);
        // Every non-final chunk should end at a paragraph boundary,
        // since paragraphs here are well under the chunk size.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.text.ends_with("\n\n"),
                "chunk did not break on a paragraph: {:?}",
                &chunk.text[chunk.text.len().saturating_sub(40)..]
            );
        }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk("just a short document", SourceDocument::Behavioral);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just a short document");
    }

    #[test]
    fn blank_text_yields_no_chunks() {
        let chunker = RecursiveChunker::new(1000, 200);
        assert!(chunker.chunk("   \n\n  ", SourceDocument::Resume).is_empty());
        assert!(chunker.chunk("", SourceDocument::Resume).is_empty());
    }

    #[test]
    fn hard_cut_respects_char_boundaries() {
        // No spaces or punctuation: forces the hard-cut fallback over
        // multi-byte characters. The overlap is 200 chars = 400 bytes.
        let text = "é".repeat(1500);
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk(&text, SourceDocument::Resume);
        assert!(chunks.len() >= 2);
        assert_eq!(reconstruct(&chunks, 400), text);
    }

    #[test]
    fn sizes_count_characters_not_bytes() {
        // Two-byte characters throughout: a byte-measured chunker
        // would stop at 500 characters instead of 1000.
        let text = "é".repeat(1500);
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.chunk(&text, SourceDocument::Resume);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks[1].text.chars().count(), 700, "second chunk resumes 200 chars back");
    }

    #[test]
    fn documents_chunked_in_order() {
        let chunker = RecursiveChunker::new(1000, 200);
        let docs = vec![
            ("resume body".to_string(), SourceDocument::Resume),
            ("behavioral body".to_string(), SourceDocument::Behavioral),
        ];
        let chunks = chunker.chunk_documents(&docs);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, SourceDocument::Resume);
        assert_eq!(chunks[1].source, SourceDocument::Behavioral);
    }
}
