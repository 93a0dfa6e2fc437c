//! Immutable, char-addressable source text

use crate::utils::{Position, SourceMap};

/// Scan input with line endings normalized to `\n`
#[derive(Debug, Clone)]
pub struct Source {
    chars: Vec<char>,
    /// Char offset of the first character of each line
    line_starts: Vec<usize>,
}

impl Source {
    pub fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut iter = text.chars().peekable();
        while let Some(ch) = iter.next() {
            if ch == '\r' {
                if iter.peek() == Some(&'\n') {
                    iter.next();
                }
                chars.push('\n');
            } else {
                chars.push(ch);
            }
        }

        let mut line_starts = vec![0];
        line_starts.extend(
            chars
                .iter()
                .enumerate()
                .filter(|(_, &ch)| ch == '\n')
                .map(|(i, _)| i + 1),
        );

        Self { chars, line_starts }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Text in `[start, end)`, clamped to the source
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// ASCII case-insensitive match of `keyword` starting at `pos`
    pub fn matches_keyword_ci(&self, pos: usize, keyword: &str) -> bool {
        let mut offset = pos;
        for expected in keyword.chars() {
            match self.chars.get(offset) {
                Some(actual) if actual.eq_ignore_ascii_case(&expected) => offset += 1,
                _ => return false,
            }
        }
        true
    }

    /// ASCII case-insensitive match of `word` ending right before `pos`
    pub fn preceded_by_ci(&self, pos: usize, word: &str) -> bool {
        let len = word.chars().count();
        pos >= len && self.matches_keyword_ci(pos - len, word)
    }

    /// Line/column position of a char offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.chars.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let column = offset - self.line_starts[line_idx];
        Position::new(offset, line_idx as u32 + 1, column as u32 + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn source_map(&self) -> SourceMap {
        SourceMap::new(&self.chars.iter().collect::<String>())
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::new(text)
    }
}
