use thiserror::Error;

mod parsers;
mod scanner;

use parsers::{scan_bind_name, skip_user_variable};
use scanner::skip_ignored_region;

pub use scanner::RegionKind;

/// Placeholder syntax accepted on input. A query uses exactly one style; the first
/// placeholder accepted decides which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`, bound by occurrence order.
    Question,
    /// `:name` or `:1`, bound by name.
    Named,
}

impl PlaceholderStyle {
    fn trigger(self) -> u8 {
        match self {
            PlaceholderStyle::Question => b'?',
            PlaceholderStyle::Named => b':',
        }
    }
}

/// What a placeholder occurrence binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Zero-based occurrence index of a `?`.
    Positional(usize),
    /// Name taken from `:name`.
    Named(String),
}

/// One accepted placeholder. `offset` points at its `?` in the rewritten SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    pub offset: usize,
    pub placeholder: Placeholder,
}

/// SQL rewritten to `?` placeholders, plus what each `?` binds to, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub sql: String,
    pub positions: Vec<PlaceholderToken>,
    pub style: Option<PlaceholderStyle>,
}

impl ParsedQuery {
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("query with an unterminated {region} specified (at byte {offset})")]
    UnterminatedRegion { region: RegionKind, offset: usize },

    #[error("named parameter name must match bindname format (at byte {offset})")]
    InvalidBindName { offset: usize },
}

/// Rewrite `?` / `:name` placeholders into driver-native `?` placeholders.
///
/// Quoted strings, quoted identifiers, `--` and `/* */` comments are copied through
/// untouched, and `@var:=` assignments are not mistaken for named placeholders:
/// ```rust
/// use sql_helper::prelude::*;
///
/// let parsed = parse_placeholders("select @n:=0, ':skip' from t where id = :id")?;
/// assert_eq!(parsed.sql, "select @n:=0, ':skip' from t where id = ?");
/// assert_eq!(parsed.positions[0].placeholder, Placeholder::Named("id".into()));
/// # Ok::<(), ParseError>(())
/// ```
/// Once one style is seen the other character is ordinary text for the rest of the query.
///
/// # Errors
/// Returns `ParseError` for unterminated strings, identifiers and block comments, or a
/// `:` not followed by a valid bind name.
pub fn parse_placeholders(sql: &str) -> Result<ParsedQuery, ParseError> {
    let bytes = sql.as_bytes();
    let mut style: Option<PlaceholderStyle> = None;
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut positions = Vec::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let Some(candidate) = next_candidate(bytes, cursor, style) else {
            break;
        };

        if let Some(next) = skip_ignored_region(sql, cursor, candidate)? {
            cursor = next;
            continue;
        }

        let next = skip_user_variable(bytes, candidate);
        if next != candidate {
            cursor = next;
            continue;
        }

        let locked = *style.get_or_insert(if bytes[candidate] == b'?' {
            PlaceholderStyle::Question
        } else {
            PlaceholderStyle::Named
        });

        match locked {
            PlaceholderStyle::Question => {
                out.push_str(&sql[copied..=candidate]);
                copied = candidate + 1;
                positions.push(PlaceholderToken {
                    offset: out.len() - 1,
                    placeholder: Placeholder::Positional(positions.len()),
                });
            }
            PlaceholderStyle::Named => {
                let name = scan_bind_name(bytes, candidate + 1)
                    .ok_or(ParseError::InvalidBindName { offset: candidate })?;
                out.push_str(&sql[copied..candidate]);
                out.push('?');
                copied = candidate + 1 + name.len();
                positions.push(PlaceholderToken {
                    offset: out.len() - 1,
                    placeholder: Placeholder::Named(name.to_owned()),
                });
            }
        }
        cursor = copied;
    }

    out.push_str(&sql[copied..]);
    tracing::debug!(placeholders = positions.len(), ?style, "parsed placeholders");

    Ok(ParsedQuery {
        sql: out,
        positions,
        style,
    })
}

fn next_candidate(bytes: &[u8], cursor: usize, style: Option<PlaceholderStyle>) -> Option<usize> {
    let rest = &bytes[cursor..];
    let found = match style {
        Some(locked) => {
            let trigger = locked.trigger();
            rest.iter().position(|b| *b == trigger)
        }
        None => rest.iter().position(|b| *b == b'?' || *b == b':'),
    };
    found.map(|at| cursor + at)
}
