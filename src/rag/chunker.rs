//! Overlapping character chunker.
//!
//! Limits and overlaps are measured in Unicode scalar values, not bytes, so
//! multi-byte text never splits mid-character.

use crate::core::config::ChunkingConfig;
use crate::ingest::Document;

/// A bounded-length text segment with provenance. Unit of indexing and
/// retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub page: u32,
    /// Character offset of the chunk within its page.
    pub offset: usize,
    pub text: String,
}

/// Splits documents into overlapping chunks, document order then position
/// order. A document with empty or whitespace-only text yields no chunks.
pub fn split_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|document| split_document(document, config))
        .collect()
}

fn split_document(document: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
    let max_chars = config.max_chars;
    let overlap = config.overlap;

    let mut chunks = Vec::new();
    if document.text.trim().is_empty() {
        return chunks;
    }

    let chars: Vec<char> = document.text.chars().collect();
    let total = chars.len();
    let mut start = 0;

    loop {
        let window_end = (start + max_chars).min(total);
        let end = if window_end == total {
            total
        } else {
            start + break_position(&chars[start..window_end], overlap)
        };

        chunks.push(Chunk {
            source: document.source.clone(),
            page: document.page,
            offset: start,
            text: chars[start..end].iter().collect(),
        });

        if end == total {
            break;
        }
        // Exact-overlap invariant: the next chunk re-reads the last `overlap`
        // characters of this one.
        start = end - overlap;
    }

    chunks
}

/// Boundary tiers, largest semantic unit first. A hard cut at the window end
/// is the fallback.
const PARAGRAPH_BREAKS: [&str; 1] = ["\n\n"];
const SENTENCE_BREAKS: [&str; 4] = [". ", "! ", "? ", "\n"];
const WORD_BREAKS: [&str; 1] = [" "];

/// Picks the cut position within a full-size window, in characters past the
/// window start. Only cuts that leave the span longer than `overlap` are
/// taken, which keeps the scan moving forward.
fn break_position(window: &[char], overlap: usize) -> usize {
    for markers in [&PARAGRAPH_BREAKS[..], &SENTENCE_BREAKS[..], &WORD_BREAKS[..]] {
        if let Some(end) = last_boundary_end(window, markers) {
            if end > overlap {
                return end;
            }
        }
    }
    window.len()
}

/// The latest position in `window` just past any of the given markers.
fn last_boundary_end(window: &[char], markers: &[&str]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for marker in markers {
        let marker_chars: Vec<char> = marker.chars().collect();
        if window.len() < marker_chars.len() {
            continue;
        }
        for start in (0..=window.len() - marker_chars.len()).rev() {
            if window[start..start + marker_chars.len()] == marker_chars[..] {
                let end = start + marker_chars.len();
                best = Some(best.map_or(end, |current| current.max(end)));
                break;
            }
        }
    }
    best
}
