//! Text layout for the display
//!
//! Messages are split into lines on real newlines and on the two-character
//! escape `\n` (as typed into a command line), then each line is word-wrapped.

/// Characters per wrapped line
pub const WRAP_COLUMNS: usize = 20;

/// Lines of `text` as they will be drawn
pub fn layout(text: &str) -> impl Iterator<Item = &str> {
    text.split("\\n")
        .flat_map(str::lines)
        .flat_map(|line| Wrap::new(line, WRAP_COLUMNS))
}

/// Greedy word wrapper over one line
///
/// Breaks at whitespace; a single word longer than the width is split.
/// Leading and trailing whitespace of every produced line is dropped, blank
/// input produces no lines.
#[derive(Debug, Clone)]
pub struct Wrap<'a> {
    rest: &'a str,
    columns: usize,
}

impl<'a> Wrap<'a> {
    pub fn new(line: &'a str, columns: usize) -> Self {
        Self {
            rest: line,
            columns: columns.max(1),
        }
    }
}

impl<'a> Iterator for Wrap<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            self.rest = "";
            return None;
        }

        let mut last_word_end = None;
        let mut overflow_at = None;
        let mut in_word = false;
        for (column, (index, c)) in rest.char_indices().enumerate() {
            if c.is_whitespace() {
                if in_word {
                    last_word_end = Some(index);
                }
                in_word = false;
            } else {
                if column >= self.columns {
                    overflow_at = Some(index);
                    break;
                }
                in_word = true;
            }
        }

        let end = match (overflow_at, last_word_end) {
            (None, _) => rest.trim_end().len(),
            (Some(_), Some(word_end)) => word_end,
            // One word wider than the line
            (Some(split), None) => split,
        };

        let (line, tail) = rest.split_at(end);
        self.rest = tail;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> std::vec::Vec<&str> {
        layout(text).collect()
    }

    #[test]
    fn test_short_line_unchanged() {
        assert_eq!(collect("hello world"), ["hello world"]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        assert_eq!(
            collect("the quick brown fox jumps over"),
            ["the quick brown fox", "jumps over"]
        );
    }

    #[test]
    fn test_exact_width_fits() {
        let line = "abcde fghij klmno pq";
        assert_eq!(line.len(), 20);
        assert_eq!(collect(line), [line]);
    }

    #[test]
    fn test_long_word_is_split() {
        assert_eq!(
            collect("abcdefghijklmnopqrstuvwxyz"),
            ["abcdefghijklmnopqrst", "uvwxyz"]
        );
    }

    #[test]
    fn test_escaped_and_real_newlines() {
        assert_eq!(collect("one\\ntwo\nthree"), ["one", "two", "three"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        assert_eq!(collect("a\n\n   \nb"), ["a", "b"]);
        assert!(collect("").is_empty());
    }
}
