//! Context window assembly for LLM prompts

use crate::rag::SearchResult;

/// Context string plus the indexes of the results that made it in
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    /// Indexes into the input result list that were used
    pub used: Vec<usize>,
}

/// Assembles retrieved chunks into a bounded context window
///
/// Chunks are taken in rank order until the character budget runs out.
/// Fragments shorter than `min_chunk_size` carry no usable information
/// and are skipped. The final chunk is truncated to fit only when at
/// least 200 characters of budget remain, otherwise it is dropped.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_length: usize,
    min_chunk_size: usize,
}

const CHUNK_SEPARATOR: &str = "\n\n---\n\n";
const TRUNCATION_MIN_BUDGET: usize = 200;

impl ContextAssembler {
    #[must_use]
    pub const fn new(max_length: usize, min_chunk_size: usize) -> Self {
        Self {
            max_length,
            min_chunk_size,
        }
    }

    #[must_use]
    pub fn assemble(&self, results: &[SearchResult]) -> AssembledContext {
        let mut text = String::new();
        let mut used = Vec::new();

        for (i, result) in results.iter().enumerate() {
            let content = result.chunk.content.trim();
            if content.chars().count() < self.min_chunk_size {
                continue;
            }

            let sep_len = if text.is_empty() {
                0
            } else {
                CHUNK_SEPARATOR.chars().count()
            };
            let header = Self::chunk_header(result);
            let entry_len = header.chars().count() + content.chars().count();
            let current_len = text.chars().count();

            if current_len + sep_len + entry_len <= self.max_length {
                if sep_len > 0 {
                    text.push_str(CHUNK_SEPARATOR);
                }
                text.push_str(&header);
                text.push_str(content);
                used.push(i);
                continue;
            }

            // Out of budget: truncate this chunk in if the remainder is
            // big enough to be worth reading, then stop either way.
            let remaining = self
                .max_length
                .saturating_sub(current_len + sep_len + header.chars().count());
            if remaining >= TRUNCATION_MIN_BUDGET {
                if sep_len > 0 {
                    text.push_str(CHUNK_SEPARATOR);
                }
                text.push_str(&header);
                let truncated: String = content.chars().take(remaining.saturating_sub(3)).collect();
                text.push_str(&truncated);
                text.push_str("...");
                used.push(i);
            }
            break;
        }

        AssembledContext { text, used }
    }

    fn chunk_header(result: &SearchResult) -> String {
        match &result.chunk.title {
            Some(title) => format!("[{} - {}]\n", result.chunk.source, title),
            None => format!("[{}]\n", result.chunk.source),
        }
    }
}
