//! Pending-character accumulator shared by the recognizers

/// Characters consumed but not yet emitted as part of a token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    text: String,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn append_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Replace the contents wholesale (restoring a stash)
    pub fn set(&mut self, text: String) {
        self.text = text;
    }

    /// Remove the last character if it is `ch`
    pub fn truncate_last(&mut self, ch: char) -> bool {
        if self.text.ends_with(ch) {
            self.text.pop();
            true
        } else {
            false
        }
    }

    pub fn last_char(&self) -> Option<char> {
        self.text.chars().last()
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether anything other than whitespace is pending
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Take the buffered text and clear the buffer.
    ///
    /// Scanning backward from the end, any trailing run of `stop_chars` is cut
    /// off so a value ends right before its `;` or `}`. With `trim` the result
    /// is also stripped of surrounding whitespace, and whitespace between stop
    /// characters counts as part of the trailing run.
    pub fn take_and_clear(&mut self, stop_chars: &[char], trim: bool) -> String {
        let mut text = std::mem::take(&mut self.text);

        while let Some(last) = text.chars().last() {
            if stop_chars.contains(&last) || (trim && last.is_whitespace()) {
                text.pop();
            } else {
                break;
            }
        }

        if trim {
            text.trim().to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_snapshot() {
        let mut buffer = Buffer::new();
        buffer.append('a');
        buffer.append_str("bc");
        assert_eq!(buffer.snapshot(), "abc");
        assert_eq!(buffer.len(), 3);
        assert!(buffer.has_content());
    }

    #[test]
    fn test_take_and_clear_cuts_trailing_stops() {
        let mut buffer = Buffer::new();
        buffer.append_str(" red ; ");
        assert_eq!(buffer.take_and_clear(&[';', '}'], true), "red");
        assert!(buffer.is_empty());

        buffer.append_str("a;b");
        assert_eq!(buffer.take_and_clear(&[';'], false), "a;b");
    }

    #[test]
    fn test_take_and_clear_without_trim_keeps_spaces() {
        let mut buffer = Buffer::new();
        buffer.append_str(" x }}");
        assert_eq!(buffer.take_and_clear(&['}'], false), " x ");
    }

    #[test]
    fn test_truncate_last_and_set() {
        let mut buffer = Buffer::new();
        buffer.append_str("a/");
        assert!(buffer.truncate_last('/'));
        assert!(!buffer.truncate_last('/'));
        assert_eq!(buffer.as_str(), "a");

        buffer.set("restored".to_string());
        assert_eq!(buffer.last_char(), Some('d'));
        buffer.clear();
        assert!(!buffer.has_content());
    }
}
