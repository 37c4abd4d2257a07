//! Text normalization before chunking.
//!
//! Pandoc-converted books are full of typographic punctuation and stray
//! control characters that trip up TTS voices; normalize them to plain
//! ASCII equivalents and collapse whitespace runs.

/// Clean text for TTS processing: replace typographic punctuation, drop
/// control and zero-width characters, and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            // Single quotes and primes
            '\u{2018}' | '\u{2019}' | '\u{2032}' => out.push('\''),
            // Double quotes, double primes, guillemets
            '\u{201c}' | '\u{201d}' | '\u{2033}' | '\u{00ab}' | '\u{00bb}' => out.push('"'),
            // Dash variants
            '\u{2013}' | '\u{2014}' | '\u{2011}' | '\u{2012}' | '\u{2015}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00a0}' => out.push(' '),
            // Zero-width characters and BOM
            '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' => {}
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    collapse_whitespace(&out)
}

/// Collapse runs of spaces/tabs to one space and runs of newlines to at
/// most two, then trim.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count = 0;

    for c in text.chars() {
        match c {
            '\n' => {
                newline_count += 1;
                prev_was_space = false;
                if newline_count <= 2 {
                    out.push('\n');
                }
            }
            ' ' | '\t' => {
                newline_count = 0;
                if !prev_was_space {
                    out.push(' ');
                    prev_was_space = true;
                }
            }
            c => {
                newline_count = 0;
                prev_was_space = false;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}
