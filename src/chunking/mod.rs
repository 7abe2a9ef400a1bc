//! Transcript chunking.
//!
//! Splits transcript text into overlapping, fixed-size character windows.
//! Cuts prefer sentence ends, then word gaps, and fall back to a hard cut
//! when neither is found close enough to the window edge.

use crate::error::{ChatTubeError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous slice of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Position of this chunk in the transcript.
    pub order: usize,
    /// Character offset where the chunk starts.
    pub start: usize,
    /// Character offset one past the chunk's last character.
    pub end: usize,
}

impl TextChunk {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Configuration for chunking. All sizes are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    /// Maximum distance a cut may move to reach a boundary.
    pub boundary_tolerance: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            boundary_tolerance: 50,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChatTubeError::InvalidInput(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(ChatTubeError::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    // Capped below the stride so every window moves forward.
    fn effective_tolerance(&self) -> usize {
        self.boundary_tolerance.min(self.stride() - 1)
    }
}

/// Split `text` into overlapping chunks.
pub fn split(text: &str, config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
    config.validate()?;

    if text.trim().is_empty() {
        return Err(ChatTubeError::EmptyTranscript);
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let tolerance = config.effective_tolerance();

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let window_end = (start + config.chunk_size).min(len);
        let end = if window_end == len {
            len
        } else {
            find_cut(&chars, window_end, tolerance)
        };

        chunks.push(TextChunk {
            content: chars[start..end].iter().collect(),
            order: chunks.len(),
            start,
            end,
        });

        if end == len {
            break;
        }

        start = next_start(&chars, end, config.overlap, tolerance);
    }

    Ok(chunks)
}

/// Reassemble the original text from chunks produced by [`split`].
pub fn merge_chunks(chunks: &[TextChunk]) -> String {
    let mut merged = String::new();
    let mut covered: usize = 0;

    for chunk in chunks {
        let skip = covered.saturating_sub(chunk.start);
        merged.extend(chunk.content.chars().skip(skip));
        covered = covered.max(chunk.end);
    }

    merged
}

/// Number of chunks [`split`] yields when no boundary snapping happens
/// (`boundary_tolerance == 0`).
pub fn expected_chunk_count(text_len: usize, chunk_size: usize, overlap: usize) -> usize {
    if text_len == 0 {
        return 0;
    }
    if text_len <= chunk_size {
        return 1;
    }
    let stride = chunk_size - overlap;
    1 + (text_len - chunk_size).div_ceil(stride)
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// Latest cut in `[window_end - tolerance, window_end]`: a sentence boundary
/// if one exists, else a word boundary, else `window_end` itself.
fn find_cut(chars: &[char], window_end: usize, tolerance: usize) -> usize {
    let lowest = window_end - tolerance;
    let mut word_cut = None;

    for cut in (lowest..=window_end).rev() {
        let before = chars[cut - 1];
        let after = chars[cut];

        let sentence = (before.is_whitespace() && cut >= 2 && is_sentence_end(chars[cut - 2]))
            || (is_sentence_end(before) && after.is_whitespace());
        if sentence {
            return cut;
        }

        if word_cut.is_none() && (before.is_whitespace() || after.is_whitespace()) {
            word_cut = Some(cut);
        }
    }

    word_cut.unwrap_or(window_end)
}

/// Start of the window after a cut at `end`: `overlap` characters back,
/// moved forward to the next word start if one is within tolerance.
fn next_start(chars: &[char], end: usize, overlap: usize, tolerance: usize) -> usize {
    let nominal = end - overlap;
    if overlap == 0 {
        return nominal;
    }

    let limit = (nominal + tolerance).min(end - 1);
    (nominal..=limit)
        .find(|&pos| {
            !chars[pos].is_whitespace() && (pos == 0 || chars[pos - 1].is_whitespace())
        })
        .unwrap_or(nominal)
}
