use logos::Logos;
use std::fmt;

use crate::term::{Faces, Keep};

/// Token type for dice formulas.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A dice expression such as `2d6` or `dp`. `number` is `None` when omitted.
    Dice {
        /// Number of dice, if written.
        number: Option<u32>,
        /// The faces of each die.
        faces: Faces,
    },
    /// A keep modifier (`kh`, `kl2`).
    Keep(Keep),
    /// Unsigned integer literal.
    Integer(i64),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Dice { number, faces } => match number {
                Some(n) => write!(f, "{n}d{faces}"),
                None => write!(f, "d{faces}"),
            },
            Token::Keep(k) => write!(f, "{k}"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Internal logos token, borrowed from the source and converted to an owned
/// `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"[0-9]*[dD]([0-9]+|[pP])")]
    Dice,

    #[regex(r"[kK][hHlL][0-9]*")]
    Keep,

    #[regex(r"[0-9]+")]
    Integer,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex a formula into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors so every bad character is reported.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let token = match result {
            Ok(RawToken::Dice) => parse_dice(slice),
            Ok(RawToken::Keep) => parse_keep(slice),
            Ok(RawToken::Integer) => slice.parse::<i64>().ok().map(Token::Integer),
            Ok(RawToken::Plus) => Some(Token::Plus),
            Ok(RawToken::Minus) => Some(Token::Minus),
            Ok(RawToken::LBrace) => Some(Token::LBrace),
            Ok(RawToken::RBrace) => Some(Token::RBrace),
            Ok(RawToken::Comma) => Some(Token::Comma),
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
                continue;
            }
        };
        match token {
            Some(token) => tokens.push((token, span)),
            None => errors.push(LexError {
                span: span.clone(),
                message: format!("number out of range: {slice}"),
            }),
        }
    }

    (tokens, errors)
}

fn parse_dice(slice: &str) -> Option<Token> {
    let split = slice.find(['d', 'D'])?;
    let (count, rest) = slice.split_at(split);
    let number = if count.is_empty() {
        None
    } else {
        Some(count.parse::<u32>().ok()?)
    };
    let faces = match &rest[1..] {
        "p" | "P" => Faces::Plot,
        sides => Faces::Sides(sides.parse::<u32>().ok()?),
    };
    Some(Token::Dice { number, faces })
}

fn parse_keep(slice: &str) -> Option<Token> {
    let count = match &slice[2..] {
        "" => 1,
        n => n.parse::<u32>().ok()?,
    };
    match slice[..2].to_ascii_lowercase().as_str() {
        "kh" => Some(Token::Keep(Keep::Highest(count))),
        "kl" => Some(Token::Keep(Keep::Lowest(count))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "lex errors: {errors:?}");
        tokens.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn dice_and_modifier() {
        assert_eq!(
            tokens("1d20 + 5"),
            vec![
                Token::Dice {
                    number: Some(1),
                    faces: Faces::Sides(20)
                },
                Token::Plus,
                Token::Integer(5),
            ]
        );
    }

    #[test]
    fn advantage_and_plot() {
        assert_eq!(
            tokens("2d20kh+dp"),
            vec![
                Token::Dice {
                    number: Some(2),
                    faces: Faces::Sides(20)
                },
                Token::Keep(Keep::Highest(1)),
                Token::Plus,
                Token::Dice {
                    number: None,
                    faces: Faces::Plot
                },
            ]
        );
    }

    #[test]
    fn uppercase_keep_modifiers() {
        assert_eq!(
            tokens("2D20KH + {1d6,1d8}Kl2"),
            vec![
                Token::Dice {
                    number: Some(2),
                    faces: Faces::Sides(20)
                },
                Token::Keep(Keep::Highest(1)),
                Token::Plus,
                Token::LBrace,
                Token::Dice {
                    number: Some(1),
                    faces: Faces::Sides(6)
                },
                Token::Comma,
                Token::Dice {
                    number: Some(1),
                    faces: Faces::Sides(8)
                },
                Token::RBrace,
                Token::Keep(Keep::Lowest(2)),
            ]
        );
    }

    #[test]
    fn pool_with_keep_count() {
        assert_eq!(
            tokens("{2d6,1d8}kh2"),
            vec![
                Token::LBrace,
                Token::Dice {
                    number: Some(2),
                    faces: Faces::Sides(6)
                },
                Token::Comma,
                Token::Dice {
                    number: Some(1),
                    faces: Faces::Sides(8)
                },
                Token::RBrace,
                Token::Keep(Keep::Highest(2)),
            ]
        );
    }

    #[test]
    fn unexpected_characters_reported() {
        let (tokens, errors) = lex("1d6 * 2");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 4..5);
    }

    #[test]
    fn spans_track_source() {
        let (tokens, _) = lex("1d8  - 3");
        let spans: Vec<_> = tokens.into_iter().map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..3, 5..6, 7..8]);
    }

    #[test]
    fn display_round_trips_tokens() {
        let rendered: Vec<String> = tokens("d6 - 2d4kl").iter().map(Token::to_string).collect();
        assert_eq!(rendered, vec!["d6", "-", "2d4", "kl"]);
    }
}
