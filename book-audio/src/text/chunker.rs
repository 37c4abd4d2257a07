//! Budget-bounded text chunking for TTS requests.
//!
//! Chunking is deterministic and order-preserving: the same text and budget
//! always produce the same chunks, and concatenating the chunks reconstructs
//! the cleaned chapter text (whitespace is normalized by the cleaner and
//! chunks are joined on single spaces).

use super::cleaner::clean_text;
use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;
use std::sync::OnceLock;

/// Default chunk budget in characters.
pub const DEFAULT_CHUNK_BUDGET: usize = 4096;

static DETECTOR: OnceLock<SentenceDetectorDialog> = OnceLock::new();

fn detector() -> &'static SentenceDetectorDialog {
    DETECTOR.get_or_init(|| {
        SentenceDetectorDialog::new().expect("seams sentence detector should initialize")
    })
}

/// Split text into sentences using the seams dialog-aware detector.
fn split_into_sentences(text: &str) -> Vec<String> {
    detector()
        .detect_sentences_borrowed(text)
        .expect("seams sentence detection should succeed")
        .iter()
        .map(|s| s.normalize())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into chunks of at most `budget` characters, packing whole
/// sentences greedily. Sentences longer than the budget are broken on
/// clause delimiters, then word boundaries, then fixed width as a last
/// resort.
pub fn chunk_text(text: &str, budget: usize) -> Vec<String> {
    let text = clean_text(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_into_sentences(&text) {
        if sentence.len() > budget {
            flush(&mut chunks, &mut current);
            chunks.extend(split_oversized(&sentence, budget));
        } else if current.is_empty() {
            current = sentence;
        } else if current.len() + 1 + sentence.len() <= budget {
            current.push(' ');
            current.push_str(&sentence);
        } else {
            flush(&mut chunks, &mut current);
            current = sentence;
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}

/// Break one over-budget sentence at natural points.
fn split_oversized(sentence: &str, budget: usize) -> Vec<String> {
    for delim in [';', ':', ','] {
        if sentence.contains(delim) {
            let pieces = pack_pieces(sentence.split_inclusive(delim).map(str::trim), budget);
            if pieces.len() > 1 {
                return pieces
                    .into_iter()
                    .flat_map(|p| {
                        if p.len() > budget {
                            split_on_words(&p, budget)
                        } else {
                            vec![p]
                        }
                    })
                    .collect();
            }
        }
    }

    split_on_words(sentence, budget)
}

/// Greedily join pieces with single spaces without exceeding the budget.
fn pack_pieces<'a>(pieces: impl Iterator<Item = &'a str>, budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in pieces.filter(|p| !p.is_empty()) {
        if current.is_empty() {
            current = piece.to_string();
        } else if current.len() + 1 + piece.len() <= budget {
            current.push(' ');
            current.push_str(piece);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece.to_string();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split on word boundaries; a single word over budget is hard-split.
fn split_on_words(text: &str, budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.len() > budget {
            flush(&mut chunks, &mut current);
            chunks.extend(hard_split(word, budget));
        } else if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= budget {
            current.push(' ');
            current.push_str(word);
        } else {
            flush(&mut chunks, &mut current);
            current = word.to_string();
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

/// Fixed-width split, last resort for unbreakable runs.
fn hard_split(text: &str, budget: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(budget.max(1))
        .map(|c| c.iter().collect())
        .collect()
}
