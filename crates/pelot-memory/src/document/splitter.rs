use std::sync::LazyLock;

use regex::Regex;

use super::types::{Chunk, Document};

/// A sentence is a run of non-terminators followed by one terminator.
/// Text after the last terminator is not a sentence and never reaches a chunk.
static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]").unwrap());

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Soft cap on chunk length, in characters.
    pub max_length: usize,
    /// Sentences longer than this are cut into fixed-width pieces first.
    /// `None` or `Some(0)` disables the pre-split.
    pub sentence_max_length: Option<usize>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            max_length: 1000,
            sentence_max_length: Some(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                content,
                document_name: document.metadata.name.clone(),
                chunk_index: i,
            })
            .collect()
    }

    /// Greedily pack sentences into chunks.
    ///
    /// A piece is appended to the current buffer unless that would push it past
    /// `max_length`, in which case the buffer is flushed first. A single piece
    /// longer than `max_length` still becomes its own chunk.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for sentence in SENTENCE_RE.find_iter(text) {
            for piece in self.pieces(sentence.as_str()) {
                let piece_len = piece.chars().count();
                if current_len + piece_len > self.config.max_length {
                    flush(&mut chunks, &mut current);
                    current_len = 0;
                }
                current.push_str(piece);
                current_len += piece_len;
            }
        }
        flush(&mut chunks, &mut current);

        chunks
    }

    fn pieces<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        match self.config.sentence_max_length {
            Some(limit) if limit > 0 && sentence.chars().count() > limit => {
                split_chars(sentence, limit)
            }
            _ => vec![sentence],
        }
    }
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    chunks.push(current.trim().to_owned());
    current.clear();
}

/// Cut `text` into consecutive slices of `width` characters; the last may be shorter.
fn split_chars(text: &str, width: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == width {
            pieces.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
