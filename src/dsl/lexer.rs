//! Lexer (tokenizer) for equation terms.

use crate::error::{Result, ScmError};
use crate::model::{VarIndex, Vocabulary};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in an equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// '+'
    Plus,
    /// '-'
    Minus,
    /// Run of digits and decimal points
    Number,
    /// A vocabulary variable
    Variable(VarIndex),
    /// '^' followed by an exponent; the text holds the exponent digits
    Power,
    /// End of input
    Eof,
}

/// Lexer for tokenizing a term or equation against a vocabulary.
///
/// Variables are recognized by longest match against the vocabulary, so names
/// such as `Z_1` are never split into a name and a number.
pub struct Lexer<'a> {
    input: &'a str,
    vocab: &'a Vocabulary,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str, vocab: &'a Vocabulary) -> Self {
        Self {
            input,
            vocab,
            chars: input.char_indices().peekable(),
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let (pos, ch) = match self.chars.peek().copied() {
            Some(next) => next,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    column: self.column,
                });
            }
        };

        let start_column = self.column;

        let (kind, text) = match ch {
            '+' => {
                self.advance();
                (TokenKind::Plus, "+".to_string())
            }
            '-' => {
                self.advance();
                (TokenKind::Minus, "-".to_string())
            }
            '0'..='9' | '.' => {
                let text = self.read_while(|c| c.is_ascii_digit() || c == '.');
                (TokenKind::Number, text)
            }
            '^' => {
                self.advance();
                let text = self.read_while(|c| c.is_ascii_digit());
                if text.is_empty() {
                    return Err(ScmError::unknown_symbol(self.input, "^", start_column));
                }
                (TokenKind::Power, text)
            }
            _ => match self.vocab.longest_match(&self.input[pos..]) {
                Some((index, len)) => {
                    self.skip_bytes(pos + len);
                    (TokenKind::Variable(index), self.vocab.name(index).to_string())
                }
                None => {
                    let symbol = self.read_while(|c| c.is_alphanumeric() || c == '_');
                    let symbol = if symbol.is_empty() { ch.to_string() } else { symbol };
                    return Err(ScmError::unknown_symbol(self.input, symbol, start_column));
                }
            },
        };

        Ok(Token {
            kind,
            text,
            column: start_column,
        })
    }

    /// Consume the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.column += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advance until the byte offset `end` is reached.
    fn skip_bytes(&mut self, end: usize) {
        while let Some(&(pos, _)) = self.chars.peek() {
            if pos >= end {
                break;
            }
            self.advance();
        }
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if pred(ch) {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

/// Parse a plain number: optional sign, digits, at most one decimal point.
///
/// Exponents, `inf` and `nan` are not accepted, and neither are literals too
/// large to represent as a finite `f64`.
pub fn parse_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    let has_digit = digits.chars().any(|c| c.is_ascii_digit());
    let well_formed = digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !has_digit || !well_formed {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["A", "B", "Z_1"]).unwrap()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        let vocab = vocab();
        Lexer::new(input, &vocab)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("2"), Some(2.0));
        assert_eq!(parse_number("-0.3"), Some(-0.3));
        assert_eq!(parse_number("+1.5"), Some(1.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("A"), None);
    }

    #[test]
    fn test_parse_number_rejects_overflow() {
        assert_eq!(parse_number(&"9".repeat(400)), None);
        assert_eq!(parse_number(&format!("-{}", "9".repeat(400))), None);
        assert!(parse_number(&"9".repeat(300)).is_some());
    }

    #[test]
    fn test_lexer_term() {
        assert_eq!(
            kinds("-0.3Z_1"),
            vec![
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Variable(VarIndex(2)),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lexer_power() {
        let vocab = vocab();
        let tokens = Lexer::new("1.6Z_1^2", &vocab).tokenize().unwrap();
        assert_eq!(tokens[0].text, "1.6");
        assert_eq!(tokens[1].text, "Z_1");
        assert_eq!(tokens[2].kind, TokenKind::Power);
        assert_eq!(tokens[2].text, "2");
        assert_eq!(tokens[2].column, 7);
    }

    #[test]
    fn test_lexer_unknown_symbol() {
        let vocab = vocab();
        let err = Lexer::new("2AJ", &vocab).tokenize().unwrap_err();
        match err {
            ScmError::UnknownSymbol { symbol, column, .. } => {
                assert_eq!(symbol, "J");
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(Lexer::new("A^", &vocab).tokenize().is_err());
        assert!(Lexer::new("A*B", &vocab).tokenize().is_err());
    }
}
