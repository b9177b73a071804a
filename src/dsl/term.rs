//! Parser for single equation terms such as `-0.3AB` or `A^2`.

use super::lexer::{parse_number, Lexer, TokenKind};
use crate::error::{Result, ScmError};
use crate::model::{ParentSet, Term, VarIndex, Vocabulary};

/// Parse one monomial into its parents and coefficient.
///
/// A term is an optional sign, an optional coefficient and up to two variable
/// occurrences. A variable appears twice only through an explicit `^2`
/// (`A^2`, never `AA`), and a squared variable cannot be combined with
/// another one. A term without variables is a bias term.
pub fn parse_term(term: &str, vocab: &Vocabulary) -> Result<Term> {
    let tokens = Lexer::new(term, vocab).tokenize()?;
    let mut tokens = tokens.into_iter().peekable();

    let mut sign = 1.0;
    if let Some(token) = tokens.peek() {
        match token.kind {
            TokenKind::Plus => {
                tokens.next();
            }
            TokenKind::Minus => {
                sign = -1.0;
                tokens.next();
            }
            _ => {}
        }
    }

    let mut magnitude = None;
    if let Some(token) = tokens.next_if(|t| t.kind == TokenKind::Number) {
        let value = parse_number(&token.text)
            .ok_or_else(|| ScmError::term(term, format!("invalid number '{}'", token.text)))?;
        magnitude = Some(value);
    }

    let mut occurrences: Vec<VarIndex> = Vec::with_capacity(2);
    let mut quadratic = false;
    let mut after_variable = false;

    for token in tokens {
        match token.kind {
            TokenKind::Variable(index) => {
                if quadratic {
                    return Err(ScmError::term(
                        term,
                        "a squared variable cannot be combined with other variables",
                    ));
                }
                if occurrences.contains(&index) {
                    return Err(ScmError::term(
                        term,
                        format!("variable '{}' repeated; write it as {}^2", token.text, token.text),
                    ));
                }
                if occurrences.len() == 2 {
                    return Err(ScmError::term(term, "terms are at most second degree"));
                }
                occurrences.push(index);
                after_variable = true;
                continue;
            }
            TokenKind::Power => {
                if !after_variable {
                    return Err(ScmError::term(term, "'^' must follow a variable"));
                }
                if token.text != "2" {
                    return Err(ScmError::term(
                        term,
                        format!("unsupported power {}; only ^2 is allowed", token.text),
                    ));
                }
                if occurrences.len() > 1 {
                    return Err(ScmError::term(
                        term,
                        "a squared variable cannot be combined with other variables",
                    ));
                }
                let squared = occurrences[0];
                occurrences.push(squared);
                quadratic = true;
            }
            TokenKind::Number => {
                return Err(ScmError::term(
                    term,
                    format!("coefficient '{}' must precede the variables", token.text),
                ));
            }
            TokenKind::Plus | TokenKind::Minus => {
                return Err(ScmError::term(term, "a term holds a single leading sign"));
            }
            TokenKind::Eof => break,
        }
        after_variable = false;
    }

    if occurrences.is_empty() && magnitude.is_none() {
        return Err(ScmError::term(term, "term has neither a coefficient nor a variable"));
    }

    let coefficient = sign * magnitude.unwrap_or(1.0);
    Ok(Term::new(ParentSet::from_occurrences(occurrences), coefficient))
}
