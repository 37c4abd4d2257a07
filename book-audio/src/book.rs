//! Chapter segmentation and selection.
//!
//! Chapters are delimited by heading lines of the form `# Title`. The scan
//! records every heading in document order; a chapter's span runs from its
//! heading to the next heading (or end of text), so a non-selected heading
//! such as a preface still bounds its neighbor correctly.

use glob::Pattern;
use regex::Regex;
use std::sync::OnceLock;

/// A titled span of the source text. `start..end` covers the heading line
/// and everything up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub start: usize,
    pub end: usize,
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.*)$").unwrap())
}

/// Split the document into titled chapter spans.
///
/// Returns an empty vec when no heading matches; that is a no-op, not an
/// error. Headings with a blank title still act as span boundaries but do
/// not produce a chapter of their own.
pub fn scan_chapters(text: &str) -> Vec<Chapter> {
    let headings: Vec<(usize, &str)> = heading_re()
        .captures_iter(text)
        .map(|c| {
            let m = c.get(0).unwrap();
            (m.start(), c.get(1).unwrap().as_str().trim_end())
        })
        .collect();

    headings
        .iter()
        .enumerate()
        .filter(|(_, (_, title))| !title.is_empty())
        .map(|(i, (start, title))| Chapter {
            title: title.to_string(),
            start: *start,
            end: headings.get(i + 1).map(|(s, _)| *s).unwrap_or(text.len()),
        })
        .collect()
}

/// Select the chapters whose titles match the glob pattern, preserving
/// order and the span boundaries computed from the full heading list.
pub fn select_chapters(chapters: &[Chapter], pattern: &Pattern) -> Vec<Chapter> {
    chapters
        .iter()
        .filter(|c| pattern.matches(&c.title))
        .cloned()
        .collect()
}

/// Replace every non-alphanumeric character with an underscore.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headings_yields_no_chapters() {
        let chapters = scan_chapters("Just some prose.\nNo markers anywhere.\n");
        assert!(chapters.is_empty());
    }

    #[test]
    fn test_spans_partition_text() {
        let text = "intro\n# One\nfirst body\n# Two\nsecond body\n";
        let chapters = scan_chapters(text);
        assert_eq!(chapters.len(), 2);

        assert_eq!(chapters[0].title, "One");
        assert_eq!(chapters[1].title, "Two");

        // Spans partition [first_heading_start, len) with no gaps.
        assert_eq!(chapters[0].start, text.find("# One").unwrap());
        assert_eq!(chapters[0].end, chapters[1].start);
        assert_eq!(chapters[1].end, text.len());
        assert_eq!(&text[chapters[0].start..chapters[0].end], "# One\nfirst body\n");
    }

    #[test]
    fn test_last_chapter_extends_to_end_of_text() {
        let text = "# Only\nno trailing newline";
        let chapters = scan_chapters(text);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].end, text.len());
    }

    #[test]
    fn test_non_selected_heading_still_bounds_neighbor() {
        let text = "# Chapter 1\naaa\n# Appendix\nbbb\n# Chapter 2\nccc\n";
        let chapters = scan_chapters(text);
        let pattern = Pattern::new("Chapter *").unwrap();
        let selected = select_chapters(&chapters, &pattern);

        assert_eq!(selected.len(), 2);
        // Chapter 1 ends at the appendix heading, not at Chapter 2.
        assert_eq!(selected[0].end, text.find("# Appendix").unwrap());
        assert_eq!(selected[1].title, "Chapter 2");
    }

    #[test]
    fn test_double_hash_is_not_a_heading() {
        let chapters = scan_chapters("## Subsection\ntext\n");
        assert!(chapters.is_empty());
    }

    #[test]
    fn test_blank_title_dropped_but_bounds_span() {
        let text = "# One\naaa\n# \t\n# Two\nbbb\n";
        let chapters = scan_chapters(text);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "One");
        // The blank heading ends the first chapter's span.
        assert_eq!(chapters[0].end, text.find("# \t").unwrap());
    }

    #[test]
    fn test_title_trailing_whitespace_trimmed() {
        let chapters = scan_chapters("# Chapter 1   \nbody\n");
        assert_eq!(chapters[0].title, "Chapter 1");
    }

    #[test]
    fn test_select_preserves_order() {
        let text = "# Chapter 2\nx\n# Preface\ny\n# Chapter 1\nz\n";
        let chapters = scan_chapters(text);
        let pattern = Pattern::new("Chapter *").unwrap();
        let selected = select_chapters(&chapters, &pattern);
        let titles: Vec<&str> = selected.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter 2", "Chapter 1"]);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Chapter 1"), "Chapter_1");
        assert_eq!(slugify("Chapter 12: The End!"), "Chapter_12__The_End_");
        assert_eq!(slugify("abc123"), "abc123");
    }
}
