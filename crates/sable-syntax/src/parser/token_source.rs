use crate::lexer::Token;
use crate::{SyntaxKind, TextRange};

/// Index-addressable view over a fully lexed token buffer.
///
/// The parser only ever looks at significant tokens; trivia stays in `raw` and is
/// forwarded into the tree when the token it precedes is bumped. Because the cursor
/// is a plain index, checkpointing is a copy and rewinding is an assignment.
pub(crate) struct TokenSource<'t> {
    text: &'t str,
    raw: Vec<Token>,
    /// Indices into `raw` of every non-trivia token. The last entry is always `Eof`.
    significant: Vec<u32>,
    cursor: usize,
}

impl<'t> TokenSource<'t> {
    pub(crate) fn new(text: &'t str, raw: Vec<Token>) -> Self {
        let mut significant: Vec<u32> = raw
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.kind.is_trivia())
            .map(|(idx, _)| idx as u32)
            .collect();

        let mut raw = raw;
        if raw.last().map(|t| t.kind) != Some(SyntaxKind::Eof) {
            let end = text.len();
            raw.push(Token {
                kind: SyntaxKind::Eof,
                range: TextRange::new(end, end),
            });
            significant.push((raw.len() - 1) as u32);
        }

        Self {
            text,
            raw,
            significant,
            cursor: 0,
        }
    }

    pub(crate) fn current(&self) -> Token {
        self.peek(0)
    }

    /// Token `n` positions after the cursor; clamps to `Eof`.
    pub(crate) fn peek(&self, n: usize) -> Token {
        self.raw[self.raw_index(n)]
    }

    /// Consumes and returns the current token. `Eof` is never consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current();
        if self.cursor + 1 < self.significant.len() {
            self.cursor += 1;
        }
        token
    }

    pub(crate) fn position(&self) -> usize {
        self.cursor
    }

    pub(crate) fn reset(&mut self, position: usize) {
        debug_assert!(position < self.significant.len());
        self.cursor = position;
    }

    /// Whether tokens `n` and `n + 1` touch with no trivia between them.
    pub(crate) fn is_adjacent(&self, n: usize) -> bool {
        self.peek(n).range.end == self.peek(n + 1).range.start
            && self.raw_index(n) + 1 == self.raw_index(n + 1)
    }

    pub(crate) fn raw_index(&self, n: usize) -> usize {
        let idx = (self.cursor + n).min(self.significant.len() - 1);
        self.significant[idx] as usize
    }

    pub(crate) fn raw_token(&self, raw_index: usize) -> Token {
        self.raw[raw_index]
    }

    pub(crate) fn text_of(&self, token: Token) -> &'t str {
        token.text(self.text)
    }

    pub(crate) fn text(&self) -> &'t str {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn skips_trivia_and_clamps_at_eof() {
        let text = "a /* c */ b";
        let source = TokenSource::new(text, lex(text));
        assert_eq!(source.text_of(source.current()), "a");
        assert_eq!(source.text_of(source.peek(1)), "b");
        assert_eq!(source.peek(2).kind, SyntaxKind::Eof);
        assert_eq!(source.peek(50).kind, SyntaxKind::Eof);
    }

    #[test]
    fn advance_never_moves_past_eof() {
        let text = "x";
        let mut source = TokenSource::new(text, lex(text));
        source.advance();
        let at_eof = source.position();
        assert_eq!(source.advance().kind, SyntaxKind::Eof);
        assert_eq!(source.position(), at_eof);
    }

    #[test]
    fn adjacency_requires_no_trivia() {
        let text = "> > >>";
        let source = TokenSource::new(text, lex(text));
        assert!(!source.is_adjacent(0));
        assert!(!source.is_adjacent(1));
        assert!(source.is_adjacent(2));
    }

    #[test]
    fn reset_restores_cursor() {
        let text = "a b c";
        let mut source = TokenSource::new(text, lex(text));
        let start = source.position();
        source.advance();
        source.advance();
        source.reset(start);
        assert_eq!(source.text_of(source.current()), "a");
    }
}
