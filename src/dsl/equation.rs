//! Parser for equations: signed sums of terms such as `2 + A - 2.8B`.

use std::collections::HashSet;

use super::term::parse_term;
use crate::error::{Result, ScmError};
use crate::model::{Term, Vocabulary};

/// Parse an equation into its terms, in order of appearance.
///
/// Whitespace is ignored. The only top-level operators are `+` and `-`, so
/// the equation is cut in front of every sign and each piece is handed to
/// [`parse_term`]. No two terms may reference the same parents: `2AB` and
/// `3BA` collide.
pub fn parse_equation(equation: &str, vocab: &Vocabulary) -> Result<Vec<Term>> {
    let compact: String = equation.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ScmError::EmptyEquation);
    }

    check_symbols(&compact, vocab)?;

    let mut terms = Vec::new();
    let mut seen = HashSet::new();
    for piece in split_terms(&compact) {
        let term = parse_term(piece, vocab)?;
        if !seen.insert(term.parents.clone()) {
            return Err(ScmError::DuplicateTerm {
                equation: compact.clone(),
                parents: term.parents.display(vocab),
            });
        }
        tracing::trace!(term = piece, coefficient = term.coefficient, "parsed term");
        terms.push(term);
    }

    Ok(terms)
}

/// Reject characters that can appear neither in numbers, operators nor
/// vocabulary names.
fn check_symbols(equation: &str, vocab: &Vocabulary) -> Result<()> {
    for (i, ch) in equation.chars().enumerate() {
        let allowed = ch.is_ascii_digit()
            || matches!(ch, '.' | '+' | '-' | '^')
            || vocab.contains_char(ch);
        if !allowed {
            return Err(ScmError::unknown_symbol(equation, ch.to_string(), i + 1));
        }
    }
    Ok(())
}

/// Split before every `+`/`-` that is not at the start.
fn split_terms(equation: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, ch) in equation.char_indices() {
        if i > start && matches!(ch, '+' | '-') {
            pieces.push(&equation[start..i]);
            start = i;
        }
    }
    pieces.push(&equation[start..]);
    pieces
}
