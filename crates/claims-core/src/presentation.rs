//! Typewriter-style progressive reveal of report lines
//!
//! `present` returns a lazy iterator. Each `next()` appends one character to
//! the current line and reports how long the consumer should wait before
//! pulling again. Nothing runs in the background: once the consumer stops
//! pulling (or the token is cancelled) no further text is produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared flag used to stop a presentation from another owner
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One step of the reveal: the full partial text for `line`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealEvent {
    pub line: usize,
    /// Raw prefix of the line, not escaped
    pub text: String,
    /// Whether this event completes its line
    pub line_complete: bool,
    /// How long to wait before pulling the next event
    pub pause: Duration,
}

impl RevealEvent {
    /// Text safe to write into a markup-capable surface
    pub fn escaped(&self) -> String {
        escape_html(&self.text)
    }
}

/// Iterator over reveal events; single use
#[derive(Debug)]
pub struct Presentation {
    lines: Vec<Vec<char>>,
    char_delay: Duration,
    line_delay: Duration,
    token: CancelToken,
    line: usize,
    /// Characters of the current line already revealed
    revealed: usize,
}

pub fn present(lines: &[String], char_delay: Duration, line_delay: Duration) -> Presentation {
    Presentation::new(lines, char_delay, line_delay, CancelToken::new())
}

impl Presentation {
    pub fn new(
        lines: &[String],
        char_delay: Duration,
        line_delay: Duration,
        token: CancelToken,
    ) -> Self {
        Self {
            lines: lines.iter().map(|l| l.chars().collect()).collect(),
            char_delay,
            line_delay,
            token,
            line: 0,
            revealed: 0,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.line >= self.lines.len() || self.token.is_cancelled()
    }
}

impl Iterator for Presentation {
    type Item = RevealEvent;

    fn next(&mut self) -> Option<RevealEvent> {
        if self.is_finished() {
            return None;
        }

        let chars = &self.lines[self.line];
        let line = self.line;

        // An empty line still gets one event so the surface knows it exists
        let (text, line_complete) = if chars.is_empty() {
            (String::new(), true)
        } else {
            self.revealed += 1;
            (
                chars[..self.revealed].iter().collect::<String>(),
                self.revealed == chars.len(),
            )
        };

        let mut pause = self.char_delay;
        if line_complete {
            self.line += 1;
            self.revealed = 0;
            if self.line < self.lines.len() {
                pause += self.line_delay;
            }
        }

        Some(RevealEvent {
            line,
            text,
            line_complete,
            pause,
        })
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const CHAR: Duration = Duration::from_millis(20);
    const LINE: Duration = Duration::from_millis(500);

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_chars_two_events() {
        let events: Vec<_> = present(&lines(&["AB"]), CHAR, LINE)
            .map(|e| (e.line, e.text))
            .collect();
        assert_eq!(
            events,
            vec![(0, "A".to_string()), (0, "AB".to_string())]
        );
    }

    #[test]
    fn test_line_delay_only_between_lines() {
        let events: Vec<_> = present(&lines(&["ab", "c"]), CHAR, LINE).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].pause, CHAR);
        assert_eq!(events[1].pause, CHAR + LINE);
        assert!(events[1].line_complete);
        assert_eq!(events[2].pause, CHAR);
        assert_eq!(events[2].line, 1);
    }

    #[test]
    fn test_empty_line_emits_single_event() {
        let events: Vec<_> = present(&lines(&["", "x"]), CHAR, LINE).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].line, 0);
        assert_eq!(events[0].text, "");
        assert!(events[0].line_complete);
    }

    #[test]
    fn test_multibyte_chars_revealed_whole() {
        let texts: Vec<_> = present(&lines(&["€5"]), CHAR, LINE).map(|e| e.text).collect();
        assert_eq!(texts, vec!["€".to_string(), "€5".to_string()]);
    }

    #[test]
    fn test_cancel_stops_stream() {
        let mut stream = present(&lines(&["hello"]), CHAR, LINE);
        let token = stream.token().clone();
        assert!(stream.next().is_some());
        token.cancel();
        assert!(stream.next().is_none());
        assert!(stream.is_finished());
    }

    #[test]
    fn test_escaped_partial_text() {
        let texts: Vec<_> = present(&lines(&["<b>"]), CHAR, LINE)
            .map(|e| e.escaped())
            .collect();
        assert_eq!(
            texts,
            vec!["&lt;".to_string(), "&lt;b".to_string(), "&lt;b&gt;".to_string()]
        );
    }

    #[test]
    fn test_no_lines_no_events() {
        assert_eq!(present(&[], CHAR, LINE).count(), 0);
    }

    proptest! {
        /// Property: one event per character and the last event of each line is the line
        #[test]
        fn reveals_every_line_in_order(input in prop::collection::vec("[a-zA-Z0-9 <>&€]{1,20}", 0..6)) {
            let events: Vec<_> = present(&input, Duration::ZERO, Duration::ZERO).collect();
            let total: usize = input.iter().map(|l| l.chars().count()).sum();
            prop_assert_eq!(events.len(), total);

            let finals: Vec<String> = events
                .iter()
                .filter(|e| e.line_complete)
                .map(|e| e.text.clone())
                .collect();
            prop_assert_eq!(finals, input);
        }

        /// Property: escaped output never contains raw angle brackets
        #[test]
        fn escaping_removes_markup(s in ".*") {
            let escaped = escape_html(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }
    }
}
