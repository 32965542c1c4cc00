//! Chunking strategies for document splitting

use tracing::debug;
use tracing::warn;

use crate::documents::Chunk;
use crate::documents::Document;

/// Which chunking strategy produced a set of chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkingStrategy {
    /// Character-budget recursive splitting with overlap
    Basic,
    /// Splitting on an explicit delimiter embedded in the document
    Delimiter,
}

impl ChunkingStrategy {
    /// Collection name in the vector store for this strategy
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Delimiter => "delimiter",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "delimiter" | "custom" => Self::Delimiter,
            _ => Self::Basic,
        }
    }
}

/// Recursive character splitter with overlap
///
/// Splits on the coarsest separator that still produces pieces within the
/// chunk size budget, recursing on oversized pieces with the next finer
/// separator. Separator order: paragraph, line, word, character.
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl RecursiveChunker {
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let overlap = if chunk_overlap >= chunk_size {
            warn!(
                "chunk_overlap {} >= chunk_size {}; clamping to chunk_size / 5",
                chunk_overlap, chunk_size
            );
            chunk_size / 5
        } else {
            chunk_overlap
        };

        Self {
            chunk_size,
            chunk_overlap: overlap,
            separators: vec!["\n\n", "\n", " ", ""],
        }
    }

    /// Split a document into chunks
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let pieces = self.split_text(&document.content);
        debug!(
            "Recursive chunking produced {} chunks from {} ({} chars)",
            pieces.len(),
            document.source,
            document.content.chars().count()
        );

        pieces
            .into_iter()
            .enumerate()
            .map(|(idx, content)| Chunk {
                content,
                source: document.source.clone(),
                title: document.title.clone(),
                chunk_index: idx,
            })
            .collect()
    }

    /// Split raw text into size-bounded pieces
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces = self.split_recursive(text, &self.separators);
        pieces
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let (separator, remaining) = match separators.split_first() {
            Some((sep, rest)) => (*sep, rest),
            None => return vec![text.to_string()],
        };

        let raw_pieces: Vec<String> = if separator.is_empty() {
            // Character-level fallback: hard split into budget-sized pieces
            return split_by_chars(text, self.chunk_size, self.chunk_overlap);
        } else {
            text.split(separator).map(str::to_string).collect()
        };

        // Recurse into pieces that are still over budget
        let mut pieces = Vec::new();
        for piece in raw_pieces {
            if char_len(&piece) > self.chunk_size {
                pieces.extend(self.split_recursive(&piece, remaining));
            } else {
                pieces.push(piece);
            }
        }

        self.merge_pieces(pieces, separator)
    }

    /// Greedily merge pieces into chunks, carrying overlap between chunks
    fn merge_pieces(&self, pieces: Vec<String>, separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if piece_len == 0 {
                continue;
            }

            let added = if current_len == 0 {
                piece_len
            } else {
                piece_len + sep_len
            };

            if current_len + added > self.chunk_size && current_len > 0 {
                chunks.push(current.clone());

                // Seed the next chunk with the tail of the previous one,
                // unless that would already blow the budget
                let overlap = tail_chars(&current, self.chunk_overlap);
                if char_len(&overlap) + sep_len + piece_len > self.chunk_size {
                    current = String::new();
                } else {
                    current = overlap;
                }
                current_len = char_len(&current);
            }

            if current_len > 0 {
                current.push_str(separator);
            }
            current.push_str(&piece);
            current_len = char_len(&current);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

/// Delimiter-based splitter for documents with explicit section markers
///
/// Documents prepared for this strategy carry a delimiter (default `/$$/`)
/// between sections. A document without the delimiter becomes a single
/// chunk.
pub struct DelimiterChunker {
    delimiter: String,
}

impl DelimiterChunker {
    #[must_use]
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Split a document on the delimiter
    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.content;

        let pieces: Vec<String> = if text.contains(&self.delimiter) {
            text.split(&self.delimiter)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        } else {
            warn!(
                "Delimiter {:?} not found in {}; indexing as a single chunk",
                self.delimiter, document.source
            );
            vec![text.trim().to_string()]
        };

        debug!(
            "Delimiter chunking produced {} chunks from {}",
            pieces.len(),
            document.source
        );

        pieces
            .into_iter()
            .enumerate()
            .map(|(idx, content)| Chunk {
                content,
                source: document.source.clone(),
                title: document.title.clone(),
                chunk_index: idx,
            })
            .collect()
    }
}

impl Default for DelimiterChunker {
    fn default() -> Self {
        Self::new("/$$/")
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of a string (UTF-8 safe)
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    if len <= n {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

/// Hard split into `size`-char pieces with `overlap` chars carried over
fn split_by_chars(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document::new(content, "test.txt")
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = RecursiveChunker::new(1000, 200);
        let chunks = chunker.split(&doc("hello world"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn test_paragraphs_respected() {
        let chunker = RecursiveChunker::new(30, 0);
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird one";
        let chunks = chunker.split_text(text);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30, "oversized chunk: {chunk:?}");
        }
    }

    #[test]
    fn test_overlap_carried_between_chunks() {
        let chunker = RecursiveChunker::new(20, 5);
        let text = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
        let chunks = chunker.split_text(text);
        assert!(chunks.len() >= 2);
        // Each successive chunk starts with text already seen at the end of
        // the previous one
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(5).collect::<String>();
            let tail: String = tail.chars().rev().collect();
            assert!(
                pair[1].starts_with(tail.trim_start()),
                "no overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_long_unbroken_text_hard_split() {
        let chunker = RecursiveChunker::new(10, 2);
        let text = "x".repeat(35);
        let chunks = chunker.split_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let chunker = RecursiveChunker::new(10, 3);
        let text = "가나다라마바사아자차카타파하".repeat(5);
        let chunks = chunker.split_text(&text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_overlap_clamped_when_invalid() {
        let chunker = RecursiveChunker::new(10, 50);
        assert_eq!(chunker.chunk_overlap, 2);
    }

    #[test]
    fn test_delimiter_split() {
        let chunker = DelimiterChunker::default();
        let chunks = chunker.split(&doc("section one/$$/section two/$$/section three"));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "section one");
        assert_eq!(chunks[2].content, "section three");
        assert_eq!(chunks[2].chunk_index, 2);
    }

    #[test]
    fn test_delimiter_absent_yields_single_chunk() {
        let chunker = DelimiterChunker::default();
        let chunks = chunker.split(&doc("no markers in this document at all"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "no markers in this document at all");
    }

    #[test]
    fn test_delimiter_empty_sections_dropped() {
        let chunker = DelimiterChunker::default();
        let chunks = chunker.split(&doc("one/$$//$$/  /$$/two"));
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_custom_delimiter() {
        let chunker = DelimiterChunker::new("---");
        let chunks = chunker.split(&doc("a---b---c"));
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(ChunkingStrategy::parse("basic"), ChunkingStrategy::Basic);
        assert_eq!(
            ChunkingStrategy::parse("delimiter"),
            ChunkingStrategy::Delimiter
        );
        assert_eq!(
            ChunkingStrategy::parse("custom"),
            ChunkingStrategy::Delimiter
        );
        assert_eq!(ChunkingStrategy::parse("unknown"), ChunkingStrategy::Basic);
    }
}
