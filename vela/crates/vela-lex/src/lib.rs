//! Lexical analysis: converts source text into a stream of tokens with
//! line numbers attached. Illegal characters are reported through the
//! shared diagnostic handler and skipped; lexing always completes with
//! a trailing `Eof` token.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod token;

pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use vela_util::Handler;

    fn lex(src: &str) -> Vec<TokenKind> {
        let handler = Handler::new();
        tokenize(src, &handler).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_are_recognized() {
        let kinds = lex("if else while for func return break continue");
        assert_eq!(
            kinds,
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::Func,
                TokenKind::Return,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multi_char_operators_match_greedily() {
        let kinds = lex("== != <= >= && || = ! < >");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Equals,
                TokenKind::Not,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_distinguish_int_and_float() {
        let kinds = lex("42 3.14 1e3 2.5e-2");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int(42),
                TokenKind::Float(3.14),
                TokenKind::Float(1e3),
                TokenKind::Float(2.5e-2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_strip_quotes_and_allow_either_style() {
        let kinds = lex(r#""hello" 'world'"#);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Str("hello".to_string()),
                TokenKind::Str("world".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_but_advance_lines() {
        let handler = Handler::new();
        let tokens = tokenize("x = 1; // comment\n/* block\ncomment */ y = 2;", &handler);
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert!(lines.windows(2).all(|w| w[1] >= w[0]));
        let y_line = tokens
            .iter()
            .find(|t| matches!(&t.kind, TokenKind::Identifier(s) if s.as_str() == "y"))
            .unwrap()
            .line;
        assert_eq!(y_line, 3);
    }

    #[test]
    fn illegal_character_is_reported_and_skipped() {
        let handler = Handler::new();
        let tokens = tokenize("x = 1 @ 2;", &handler);
        assert!(handler.has_errors());
        // lexing continues past the '@'
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Int(2))));
    }

    #[test]
    fn token_lines_are_monotonic() {
        let handler = Handler::new();
        let tokens = tokenize("a = 1;\nb = 2;\nc = 3;\n", &handler);
        for w in tokens.windows(2) {
            assert!(w[1].line >= w[0].line);
        }
    }
}
