//! Buffered character stream with lookahead and backtracking, used by the
//! directive scanner to walk source text line by line without re-scanning.

use fcx_common::Position;

pub struct CharStream<'a> {
    input: &'a str,
    byte_position: usize,
    position: Position,
    lookahead: Vec<(char, usize)>,
    saved: Vec<StreamState>,
}

#[derive(Clone)]
struct StreamState {
    byte_position: usize,
    position: Position,
    lookahead: Vec<(char, usize)>,
}

impl<'a> CharStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            byte_position: 0,
            position: Position::start(),
            lookahead: Vec::with_capacity(4),
            saved: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_position
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek(0).is_none()
    }

    pub fn peek(&mut self, n: usize) -> Option<char> {
        while self.lookahead.len() <= n {
            if !self.fill() {
                return None;
            }
        }
        self.lookahead.get(n).map(|(ch, _)| *ch)
    }

    fn fill(&mut self) -> bool {
        let consumed: usize = self.lookahead.iter().map(|(_, len)| len).sum();
        let rest = &self.input[self.byte_position + consumed..];
        match rest.chars().next() {
            Some(ch) => {
                self.lookahead.push((ch, ch.len_utf8()));
                true
            }
            None => false,
        }
    }

    pub fn advance(&mut self) -> Option<char> {
        if self.lookahead.is_empty() {
            self.fill();
        }
        let (ch, len) = self.lookahead.drain(..1).next()?;
        self.byte_position += len;
        if ch == '\n' {
            self.position = Position::new(self.position.line + 1, 1, self.position.offset + len as u32);
        } else {
            self.position = Position::new(self.position.line, self.position.column + 1, self.position.offset + len as u32);
        }
        Some(ch)
    }

    /// Consumes characters through end of line (inclusive of the newline).
    pub fn skip_to_line_end(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek(0) {
            self.advance();
            if ch == '\n' {
                break;
            }
            out.push(ch);
        }
        out
    }

    pub fn mark(&mut self) {
        self.saved.push(StreamState {
            byte_position: self.byte_position,
            position: self.position,
            lookahead: self.lookahead.clone(),
        });
    }

    pub fn reset(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.byte_position = state.byte_position;
            self.position = state.position;
            self.lookahead = state.lookahead;
        }
    }

    pub fn commit(&mut self) {
        self.saved.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_line_and_column() {
        let mut stream = CharStream::new("ab\ncd");
        stream.advance();
        stream.advance();
        assert_eq!(stream.position(), Position::new(1, 3, 2));
        stream.advance();
        assert_eq!(stream.position(), Position::new(2, 1, 3));
    }

    #[test]
    fn mark_and_reset_rewinds_state() {
        let mut stream = CharStream::new("hello");
        stream.mark();
        stream.advance();
        stream.advance();
        stream.reset();
        assert_eq!(stream.byte_offset(), 0);
        assert_eq!(stream.peek(0), Some('h'));
    }

    #[test]
    fn skip_to_line_end_returns_line_content_without_newline() {
        let mut stream = CharStream::new("foo bar\nbaz");
        let line = stream.skip_to_line_end();
        assert_eq!(line, "foo bar");
        assert_eq!(stream.peek(0), Some('b'));
    }
}
