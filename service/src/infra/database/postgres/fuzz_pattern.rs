//! [`FuzzPattern`] definition.

use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};

/// `SIMILAR TO` pattern for fuzzy searching.
///
/// Every whitespace-separated word of the input becomes an alternative, so
/// `"LOT A"` matches references containing either `LOT` or `A`.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct FuzzPattern(String);

impl FuzzPattern {
    /// Builds a new [`FuzzPattern`] out of the given `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(format!(
            "({})",
            input.split_ascii_whitespace().format_with("|", |word, f| {
                f(&format_args!("%{}%", Self::escape(word)))
            }),
        ))
    }

    /// Escapes the characters being special in `SIMILAR TO` patterns.
    fn escape(word: &str) -> String {
        word.chars().fold(
            String::with_capacity(word.len()),
            |mut out, c| {
                if matches!(
                    c,
                    '\\' | '%' | '|' | '*' | '+' | '?' | '{' | '}' | '(' | ')'
                        | '[' | ']' | '_',
                ) {
                    out.push('\\');
                }
                out.push(c);
                out
            },
        )
    }
}

#[cfg(test)]
mod spec {
    use super::FuzzPattern;

    #[test]
    fn words_become_alternatives() {
        assert_eq!(FuzzPattern::new("LOT-A1").to_string(), "(%LOT-A1%)");
        assert_eq!(FuzzPattern::new("LOT A1").to_string(), "(%LOT%|%A1%)");
    }

    #[test]
    fn escapes_pattern_metacharacters() {
        assert_eq!(FuzzPattern::new("A_1").to_string(), r"(%A\_1%)");
        assert_eq!(FuzzPattern::new("50%").to_string(), r"(%50\%%)");
    }
}
