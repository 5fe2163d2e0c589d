use serde::{Deserialize, Serialize};

use crate::{SyntaxKind, TextRange};

/// A lexed token: a kind plus the byte range it covers.
///
/// Tokens tile the input exactly, trivia included, which is what lets the parser
/// build a lossless tree by forwarding every token it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range.start as usize..self.range.end as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexError {
    pub message: String,
    pub range: TextRange,
}

/// Tokenize `input`. The result always ends with a zero-width [`SyntaxKind::Eof`].
pub fn lex(input: &str) -> Vec<Token> {
    lex_with_errors(input).0
}

pub fn lex_with_errors(input: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        tokens.push(token);
        if token.kind == SyntaxKind::Eof {
            break;
        }
    }
    (tokens, lexer.errors)
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn next_token(&mut self) -> Token {
        let start = self.pos;
        let kind = match self.peek_char() {
            None => SyntaxKind::Eof,
            Some(c) => self.scan(c),
        };
        Token {
            kind,
            range: TextRange::new(start, self.pos),
        }
    }

    fn scan(&mut self, c: char) -> SyntaxKind {
        let start = self.pos;
        if c.is_whitespace() {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.bump_char();
            }
            return SyntaxKind::Whitespace;
        }

        match c {
            '/' if self.nth_byte(1) == Some(b'/') => {
                let kind = if self.nth_byte(2) == Some(b'/') && self.nth_byte(3) != Some(b'/') {
                    SyntaxKind::DocComment
                } else {
                    SyntaxKind::LineComment
                };
                while self.peek_byte().is_some_and(|b| b != b'\n' && b != b'\r') {
                    self.bump_char();
                }
                kind
            }
            '/' if self.nth_byte(1) == Some(b'*') => {
                self.pos += 2;
                match self.input[self.pos..].find("*/") {
                    Some(end) => {
                        self.pos += end + 2;
                        SyntaxKind::BlockComment
                    }
                    None => {
                        self.pos = self.input.len();
                        self.error(start, "unterminated block comment")
                    }
                }
            }
            '"' => self.scan_string(start),
            '\'' => self.scan_char_literal(start),
            '@' => match self.nth_byte(1) {
                Some(b'"') => {
                    self.pos += 1;
                    self.scan_verbatim_string(start, SyntaxKind::StringLiteral)
                }
                Some(b'$') if self.nth_byte(2) == Some(b'"') => {
                    self.pos += 2;
                    self.scan_verbatim_string(start, SyntaxKind::InterpolatedStringLiteral)
                }
                _ => {
                    self.pos += 1;
                    match self.peek_char() {
                        Some(c) if is_ident_start(c) => {
                            self.eat_ident_rest();
                            SyntaxKind::Identifier
                        }
                        _ => self.error(start, "expected identifier after `@`"),
                    }
                }
            },
            '$' => match (self.nth_byte(1), self.nth_byte(2)) {
                (Some(b'"'), _) => {
                    self.pos += 1;
                    if self.input[self.pos..].starts_with("\"\"\"") {
                        let kind = self.scan_raw_string(start);
                        if kind == SyntaxKind::Error {
                            kind
                        } else {
                            SyntaxKind::InterpolatedStringLiteral
                        }
                    } else {
                        self.scan_interpolated_string(start)
                    }
                }
                (Some(b'@'), Some(b'"')) => {
                    self.pos += 2;
                    self.scan_verbatim_string(start, SyntaxKind::InterpolatedStringLiteral)
                }
                _ => {
                    self.pos += 1;
                    self.error(start, "unexpected character `$`")
                }
            },
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.nth_byte(1).is_some_and(|b| b.is_ascii_digit()) => self.scan_number(start),
            c if is_ident_start(c) => {
                self.eat_ident_rest();
                SyntaxKind::from_keyword(&self.input[start..self.pos])
                    .unwrap_or(SyntaxKind::Identifier)
            }
            _ => match self.scan_punctuation() {
                Some(kind) => kind,
                None => {
                    self.bump_char();
                    let message = format!("unexpected character `{c}`");
                    self.error(start, &message)
                }
            },
        }
    }

    fn scan_punctuation(&mut self) -> Option<SyntaxKind> {
        // Longest match first. `>>` and `>>=` are deliberately absent: the parser
        // joins adjacent `>` tokens so nested generic closes stay separate.
        const TABLE: &[(&str, SyntaxKind)] = &[
            ("??=", SyntaxKind::QuestionQuestionEq),
            ("<<=", SyntaxKind::LeftShiftEq),
            ("??", SyntaxKind::QuestionQuestion),
            ("::", SyntaxKind::ColonColon),
            ("..", SyntaxKind::DotDot),
            ("->", SyntaxKind::Arrow),
            ("=>", SyntaxKind::FatArrow),
            ("==", SyntaxKind::EqEq),
            ("!=", SyntaxKind::BangEq),
            ("<=", SyntaxKind::LessEq),
            (">=", SyntaxKind::GreaterEq),
            ("<<", SyntaxKind::LeftShift),
            ("&&", SyntaxKind::AmpAmp),
            ("||", SyntaxKind::PipePipe),
            ("++", SyntaxKind::PlusPlus),
            ("--", SyntaxKind::MinusMinus),
            ("+=", SyntaxKind::PlusEq),
            ("-=", SyntaxKind::MinusEq),
            ("*=", SyntaxKind::StarEq),
            ("/=", SyntaxKind::SlashEq),
            ("%=", SyntaxKind::PercentEq),
            ("&=", SyntaxKind::AmpEq),
            ("|=", SyntaxKind::PipeEq),
            ("^=", SyntaxKind::CaretEq),
            ("(", SyntaxKind::LParen),
            (")", SyntaxKind::RParen),
            ("{", SyntaxKind::LBrace),
            ("}", SyntaxKind::RBrace),
            ("[", SyntaxKind::LBracket),
            ("]", SyntaxKind::RBracket),
            (";", SyntaxKind::Semicolon),
            (",", SyntaxKind::Comma),
            (".", SyntaxKind::Dot),
            (":", SyntaxKind::Colon),
            ("?", SyntaxKind::Question),
            ("+", SyntaxKind::Plus),
            ("-", SyntaxKind::Minus),
            ("*", SyntaxKind::Star),
            ("/", SyntaxKind::Slash),
            ("%", SyntaxKind::Percent),
            ("&", SyntaxKind::Amp),
            ("|", SyntaxKind::Pipe),
            ("^", SyntaxKind::Caret),
            ("!", SyntaxKind::Bang),
            ("~", SyntaxKind::Tilde),
            ("=", SyntaxKind::Eq),
            ("<", SyntaxKind::Less),
            (">", SyntaxKind::Greater),
        ];

        let rest = &self.input[self.pos..];
        let (text, kind) = TABLE.iter().find(|(text, _)| rest.starts_with(text))?;
        self.pos += text.len();
        Some(*kind)
    }

    fn scan_number(&mut self, start: usize) -> SyntaxKind {
        let rest = &self.bytes[self.pos..];
        if rest.len() >= 2 && rest[0] == b'0' && matches!(rest[1], b'x' | b'X' | b'b' | b'B') {
            let hex = matches!(rest[1], b'x' | b'X');
            self.pos += 2;
            let digits = self.eat_while(|b| {
                b == b'_' || if hex { b.is_ascii_hexdigit() } else { b == b'0' || b == b'1' }
            });
            let malformed = digits == 0 || self.bytes[self.pos - 1] == b'_';
            self.eat_integer_suffix();
            if malformed || self.peek_byte().is_some_and(|b| b.is_ascii_alphanumeric()) {
                self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                return self.error(start, "malformed numeric literal");
            }
            return SyntaxKind::IntLiteral;
        }

        let mut is_real = false;
        self.eat_while(|b| b.is_ascii_digit() || b == b'_');
        if self.peek_byte() == Some(b'.') && self.nth_byte(1).is_some_and(|b| b.is_ascii_digit()) {
            is_real = true;
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit() || b == b'_');
        }
        if matches!(self.peek_byte(), Some(b'e' | b'E')) {
            is_real = true;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_while(|b| b.is_ascii_digit() || b == b'_') == 0 {
                return self.error(start, "missing exponent digits in numeric literal");
            }
        }

        let kind = match self.peek_byte() {
            Some(b'f' | b'F' | b'd' | b'D' | b'm' | b'M') => {
                self.pos += 1;
                SyntaxKind::RealLiteral
            }
            _ if is_real => SyntaxKind::RealLiteral,
            _ => {
                self.eat_integer_suffix();
                SyntaxKind::IntLiteral
            }
        };

        if self.bytes[self.pos - 1] == b'_'
            || self.peek_byte().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            return self.error(start, "malformed numeric literal");
        }
        kind
    }

    fn eat_integer_suffix(&mut self) {
        match self.peek_byte() {
            Some(b'u' | b'U') => {
                self.pos += 1;
                if matches!(self.peek_byte(), Some(b'l' | b'L')) {
                    self.pos += 1;
                }
            }
            Some(b'l' | b'L') => {
                self.pos += 1;
                if matches!(self.peek_byte(), Some(b'u' | b'U')) {
                    self.pos += 1;
                }
            }
            _ => {}
        }
    }

    fn scan_string(&mut self, start: usize) -> SyntaxKind {
        if self.input[self.pos..].starts_with("\"\"\"") {
            return self.scan_raw_string(start);
        }
        self.pos += 1;
        loop {
            match self.peek_byte() {
                None | Some(b'\n' | b'\r') => {
                    return self.error(start, "unterminated string literal");
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek_byte().is_some_and(|b| b != b'\n' && b != b'\r') {
                        self.bump_char();
                    }
                }
                Some(b'"') => {
                    self.pos += 1;
                    return SyntaxKind::StringLiteral;
                }
                Some(_) => self.bump_char(),
            }
        }
    }

    /// `"""…"""` with at least three quotes; the closing run must match the opening one.
    fn scan_raw_string(&mut self, start: usize) -> SyntaxKind {
        let quotes = self.eat_while(|b| b == b'"');
        let delimiter = "\"".repeat(quotes);
        match self.input[self.pos..].find(&delimiter) {
            Some(end) => {
                self.pos += end + quotes;
                // Extra trailing quotes belong to the literal's content.
                self.eat_while(|b| b == b'"');
                SyntaxKind::RawStringLiteral
            }
            None => {
                self.pos = self.input.len();
                self.error(start, "unterminated raw string literal")
            }
        }
    }

    /// `@"…"`; a doubled quote is an escaped quote and newlines are allowed.
    fn scan_verbatim_string(&mut self, start: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        let interpolated = kind == SyntaxKind::InterpolatedStringLiteral;
        loop {
            match self.peek_byte() {
                None => return self.error(start, "unterminated verbatim string literal"),
                Some(b'"') if self.nth_byte(1) == Some(b'"') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return kind;
                }
                Some(b'{') if interpolated => {
                    if !self.skip_interpolation_hole() {
                        return self.error(start, "unterminated interpolated string literal");
                    }
                }
                Some(_) => self.bump_char(),
            }
        }
    }

    fn scan_interpolated_string(&mut self, start: usize) -> SyntaxKind {
        self.pos += 1;
        loop {
            match self.peek_byte() {
                None | Some(b'\n' | b'\r') => {
                    return self.error(start, "unterminated interpolated string literal");
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek_byte().is_some_and(|b| b != b'\n' && b != b'\r') {
                        self.bump_char();
                    }
                }
                Some(b'"') => {
                    self.pos += 1;
                    return SyntaxKind::InterpolatedStringLiteral;
                }
                Some(b'{') => {
                    if !self.skip_interpolation_hole() {
                        return self.error(start, "unterminated interpolated string literal");
                    }
                }
                Some(_) => self.bump_char(),
            }
        }
    }

    /// Skips `{{` or a balanced `{ … }` hole. Returns `false` at end of input.
    fn skip_interpolation_hole(&mut self) -> bool {
        if self.nth_byte(1) == Some(b'{') {
            self.pos += 2;
            return true;
        }
        let mut depth = 0usize;
        while let Some(b) = self.peek_byte() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return true;
                    }
                }
                b'"' => {
                    let nested = self.pos;
                    if self.scan_string(nested) == SyntaxKind::Error {
                        return false;
                    }
                    continue;
                }
                _ => {}
            }
            self.bump_char();
        }
        false
    }

    fn scan_char_literal(&mut self, start: usize) -> SyntaxKind {
        self.pos += 1;
        loop {
            match self.peek_byte() {
                None | Some(b'\n' | b'\r') => {
                    return self.error(start, "unterminated character literal");
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek_byte().is_some_and(|b| b != b'\n' && b != b'\r') {
                        self.bump_char();
                    }
                }
                Some(b'\'') => {
                    self.pos += 1;
                    return SyntaxKind::CharLiteral;
                }
                Some(_) => self.bump_char(),
            }
        }
    }

    fn eat_ident_rest(&mut self) {
        self.bump_char();
        while self.peek_char().is_some_and(is_ident_continue) {
            self.bump_char();
        }
    }

    fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek_byte().is_some_and(&mut pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn error(&mut self, start: usize, message: &str) -> SyntaxKind {
        self.errors.push(LexError {
            message: message.to_string(),
            range: TextRange::new(start, self.pos),
        });
        SyntaxKind::Error
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn nth_byte(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}
