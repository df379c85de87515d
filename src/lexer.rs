//! Byte stream → token stream.

use crate::error::Diagnostic;
use crate::token::{keyword_kind, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a [u8],
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
        }
    }

    pub fn scan(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        let col = self.current - self.line_start + 1;
        self.tokens.push(Token::new(TokenKind::Eof, "", self.line, col));
        (self.tokens, self.diagnostics)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let b = self.source[self.current];
        self.current += 1;
        b
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            0
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn start_col(&self) -> usize {
        self.start - self.line_start + 1
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        self.tokens.push(Token::new(kind, lexeme, self.line, self.start_col()));
    }

    fn error(&mut self, line: usize, col: usize, lexeme: &str, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(line, col, format!(" at '{lexeme}'"), message));
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            b'(' => self.add_token(TokenKind::LeftParen),
            b')' => self.add_token(TokenKind::RightParen),
            b'{' => self.add_token(TokenKind::LeftBrace),
            b'}' => self.add_token(TokenKind::RightBrace),
            b'[' => self.add_token(TokenKind::LeftBracket),
            b']' => self.add_token(TokenKind::RightBracket),
            b':' => self.add_token(TokenKind::Colon),
            b',' => self.add_token(TokenKind::Comma),
            b'.' => self.add_token(TokenKind::Dot),
            b'?' => self.add_token(TokenKind::Question),
            b';' => self.add_token(TokenKind::Semicolon),
            b'!' => {
                let kind = if self.match_byte(b'=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.add_token(kind);
            }
            b'=' => {
                let kind = if self.match_byte(b'=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.add_token(kind);
            }
            b'<' => {
                let kind = if self.match_byte(b'=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.add_token(kind);
            }
            b'>' => {
                let kind = if self.match_byte(b'=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.add_token(kind);
            }
            b'-' => {
                let kind = if self.match_byte(b'-') {
                    TokenKind::MinusMinus
                } else if self.match_byte(b'=') {
                    TokenKind::MinusEqual
                } else {
                    TokenKind::Minus
                };
                self.add_token(kind);
            }
            b'+' => {
                let kind = if self.match_byte(b'+') {
                    TokenKind::PlusPlus
                } else if self.match_byte(b'=') {
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                };
                self.add_token(kind);
            }
            b'*' => {
                let kind = if self.match_byte(b'=') { TokenKind::StarEqual } else { TokenKind::Star };
                self.add_token(kind);
            }
            b'/' => {
                if self.match_byte(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_byte(b'*') {
                    self.block_comment();
                } else {
                    let kind = if self.match_byte(b'=') { TokenKind::SlashEqual } else { TokenKind::Slash };
                    self.add_token(kind);
                }
            }
            b' ' | b'\r' | b'\t' => {}
            b'\n' => {
                self.line += 1;
                self.line_start = self.current;
            }
            b'"' => self.string(),
            b'0'..=b'9' => self.number(),
            b'_' | b'A'..=b'Z' | b'a'..=b'z' => self.identifier(),
            other => {
                let line = self.line;
                let col = self.start_col();
                let ch = other as char;
                self.error(line, col, &ch.to_string(), format!("Unexpected character {ch}."));
            }
        }
    }

    /// Nested block comments: tracks depth explicitly rather than
    /// recursing, so arbitrarily deep nesting cannot blow the stack.
    fn block_comment(&mut self) {
        let open_line = self.line;
        let open_col = self.start_col();
        let mut depth = 1;
        while depth > 0 {
            if self.is_at_end() {
                self.error(open_line, open_col, "/*", "Unterminated multiline comment.");
                return;
            }
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance();
                self.advance();
                depth -= 1;
            } else if self.peek() == b'/' && self.peek_next() == b'*' {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.peek() == b'\n' {
                self.advance();
                self.line += 1;
                self.line_start = self.current;
            } else {
                self.advance();
            }
        }
    }

    /// Consumes the lexeme verbatim, including a trailing `\` + escaped
    /// byte pair; escape interpretation is the parser's job.
    fn string(&mut self) {
        let open_line = self.line;
        let open_col = self.start_col();
        loop {
            if self.is_at_end() {
                self.error(open_line, open_col, "\"", "Unterminated string.");
                return;
            }
            match self.peek() {
                b'\n' => {
                    self.error(open_line, open_col, "\"", "Unterminated string.");
                    return;
                }
                b'"' => break,
                b'\\' => {
                    self.advance();
                    if !self.is_at_end() {
                        self.advance();
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        self.advance();
        self.add_token(TokenKind::String);
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.add_token(TokenKind::Number);
    }

    fn identifier(&mut self) {
        while matches!(self.peek(), b'_' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z') {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }
}

pub fn scan(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Lexer::new(source).scan()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("== != <= >= -- ++ += -= *= /="),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::MinusMinus,
                TokenKind::PlusPlus,
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_runs_to_eol() {
        let (tokens, diags) = scan("1 // two\n2");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn nested_block_comments() {
        let (tokens, diags) = scan("/* outer /* inner */ still outer */ 1");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Number);
    }

    #[test]
    fn unterminated_block_comment_anchors_at_outer_open() {
        let (_, diags) = scan("/* outer /* inner */ 1");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unterminated multiline comment.");
        assert_eq!(diags[0].col, 1);
    }

    #[test]
    fn unterminated_string_on_newline_or_eof() {
        let (_, diags) = scan("\"abc\ndef\"");
        assert_eq!(diags[0].message, "Unterminated string.");
        let (_, diags2) = scan("\"abc");
        assert_eq!(diags2[0].message, "Unterminated string.");
    }

    #[test]
    fn number_requires_leading_digit() {
        let (tokens, _) = scan("1.5");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "1.5");
        // ".5" is a Dot followed by a Number, not a single Number token.
        let (tokens2, _) = scan(".5");
        assert_eq!(tokens2[0].kind, TokenKind::Dot);
        assert_eq!(tokens2[1].kind, TokenKind::Number);
    }

    #[test]
    fn keywords_and_identifiers() {
        let (tokens, _) = scan("class fun xyz");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[1].kind, TokenKind::Fun);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn unexpected_character_is_reported_and_skipped() {
        let (tokens, diags) = scan("1 @ 2");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unexpected character @.");
        assert_eq!(tokens.len(), 3); // 1, 2, EOF
    }

    #[test]
    fn columns_reset_on_newline() {
        let (tokens, _) = scan("ab\ncd");
        assert_eq!(tokens[0].col, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].col, 1);
    }
}
