//! Text processing for TTS: cleaning and budget-bounded chunking.

pub mod chunker;
mod cleaner;

pub use chunker::{DEFAULT_CHUNK_BUDGET, chunk_text};

/// A size-bounded piece of a chapter, the unit sent to the TTS service.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Title of the chapter this chunk came from
    pub chapter_title: String,
    /// 0-based position within the chapter
    pub index: usize,
    /// The text content
    pub text: String,
}

/// Chunk a chapter body into ordered, indexed chunks within `budget` characters.
pub fn chunk_chapter(chapter_title: &str, body: &str, budget: usize) -> Vec<TextChunk> {
    chunk_text(body, budget)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk {
            chapter_title: chapter_title.to_string(),
            index,
            text,
        })
        .collect()
}
