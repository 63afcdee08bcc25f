use vela_util::{Diagnostic, Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Converts source text into a stream of [`Token`]s.
///
/// Illegal characters are diagnostic-only: [`Lexer`] reports them
/// through the shared [`Handler`] and skips a single character, then
/// keeps lexing. There is no error return from the lexer itself.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a Handler,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self { cursor: Cursor::new(source), handler, done: false }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_at(1) == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.peek_at(1) == Some('*') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    loop {
                        match self.cursor.current_char() {
                            None => break,
                            Some('*') if self.cursor.peek_at(1) == Some('/') => {
                                self.cursor.advance();
                                self.cursor.advance();
                                break;
                            }
                            Some(_) => {
                                self.cursor.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_identifier(&mut self, line: u32) -> Token {
        let text = self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = TokenKind::keyword(&text).unwrap_or_else(|| TokenKind::Identifier(Symbol::intern(&text)));
        Token::new(kind, line)
    }

    fn lex_number(&mut self, line: u32) -> Token {
        let mut text = self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.cursor.current_char() == Some('.') && self.cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push(self.cursor.advance().unwrap());
            text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.cursor.current_char(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.cursor.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.cursor.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push(self.cursor.advance().unwrap());
                if matches!(self.cursor.current_char(), Some('+') | Some('-')) {
                    text.push(self.cursor.advance().unwrap());
                }
                text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
            }
        }

        let kind = if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(text.parse().unwrap_or(0))
        };
        Token::new(kind, line)
    }

    fn lex_string(&mut self, quote: char, line: u32) -> Token {
        self.cursor.advance(); // opening quote
        let text = self.cursor.eat_while(|c| c != quote && c != '\n');
        if self.cursor.current_char() == Some(quote) {
            self.cursor.advance();
        } else {
            Diagnostic::error(format!("unterminated string literal at line {line}"))
                .span(Span::at_line(line))
                .emit(self.handler);
        }
        Token::new(TokenKind::Str(text), line)
    }

    fn report_illegal(&mut self, c: char, line: u32) {
        Diagnostic::error(format!("Illegal character '{c}' at line {line}"))
            .span(Span::at_line(line))
            .emit(self.handler);
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let line = self.cursor.line();

        let Some(c) = self.cursor.current_char() else {
            return Token::new(TokenKind::Eof, line);
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return self.lex_identifier(line);
        }
        if c.is_ascii_digit() {
            return self.lex_number(line);
        }
        if c == '"' || c == '\'' {
            return self.lex_string(c, line);
        }

        macro_rules! two_char {
            ($second:expr, $both:expr, $single:expr) => {{
                self.cursor.advance();
                if self.cursor.current_char() == Some($second) {
                    self.cursor.advance();
                    Token::new($both, line)
                } else {
                    Token::new($single, line)
                }
            }};
        }

        let tok = match c {
            '=' => two_char!('=', TokenKind::Eq, TokenKind::Equals),
            '!' => two_char!('=', TokenKind::Ne, TokenKind::Not),
            '<' => two_char!('=', TokenKind::Le, TokenKind::Lt),
            '>' => two_char!('=', TokenKind::Ge, TokenKind::Gt),
            '&' if self.cursor.peek_at(1) == Some('&') => {
                self.cursor.advance();
                self.cursor.advance();
                Token::new(TokenKind::And, line)
            }
            '|' if self.cursor.peek_at(1) == Some('|') => {
                self.cursor.advance();
                self.cursor.advance();
                Token::new(TokenKind::Or, line)
            }
            '+' => {
                self.cursor.advance();
                Token::new(TokenKind::Plus, line)
            }
            '-' => {
                self.cursor.advance();
                Token::new(TokenKind::Minus, line)
            }
            '*' => {
                self.cursor.advance();
                Token::new(TokenKind::Times, line)
            }
            '/' => {
                self.cursor.advance();
                Token::new(TokenKind::Divide, line)
            }
            '%' => {
                self.cursor.advance();
                Token::new(TokenKind::Mod, line)
            }
            '(' => {
                self.cursor.advance();
                Token::new(TokenKind::LParen, line)
            }
            ')' => {
                self.cursor.advance();
                Token::new(TokenKind::RParen, line)
            }
            '{' => {
                self.cursor.advance();
                Token::new(TokenKind::LBrace, line)
            }
            '}' => {
                self.cursor.advance();
                Token::new(TokenKind::RBrace, line)
            }
            '[' => {
                self.cursor.advance();
                Token::new(TokenKind::LBracket, line)
            }
            ']' => {
                self.cursor.advance();
                Token::new(TokenKind::RBracket, line)
            }
            ';' => {
                self.cursor.advance();
                Token::new(TokenKind::Semi, line)
            }
            ',' => {
                self.cursor.advance();
                Token::new(TokenKind::Comma, line)
            }
            other => {
                self.cursor.advance();
                self.report_illegal(other, line);
                return self.next_token();
            }
        };
        tok
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.done = true;
        }
        Some(tok)
    }
}

/// Lexes the entire source into a `Vec<Token>`, including a trailing
/// `Eof` token.
pub fn tokenize(source: &str, handler: &Handler) -> Vec<Token> {
    let _span = tracing::debug_span!("lex::tokenize").entered();
    Lexer::new(source, handler).collect()
}
