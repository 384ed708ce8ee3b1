use std::fmt;

use super::ParseError;

/// Lexical spans whose contents are never scanned for placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// `'...'`
    String,
    /// `"..."`, with `""` standing for an embedded quote
    Identifier,
    /// `--` up to the next newline (or end of text)
    LineComment,
    /// `/* ... */`
    BlockComment,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RegionKind::String => "text string",
            RegionKind::Identifier => "quoted identifier",
            RegionKind::LineComment => "line comment",
            RegionKind::BlockComment => "block comment",
        };
        f.write_str(label)
    }
}

pub(super) struct IgnoredRegion {
    kind: RegionKind,
    start: &'static str,
    end: &'static str,
    /// A doubled end delimiter does not close the region.
    escape: Option<u8>,
}

pub(super) static IGNORED_REGIONS: [IgnoredRegion; 4] = [
    IgnoredRegion {
        kind: RegionKind::String,
        start: "'",
        end: "'",
        escape: None,
    },
    IgnoredRegion {
        kind: RegionKind::Identifier,
        start: "\"",
        end: "\"",
        escape: Some(b'"'),
    },
    IgnoredRegion {
        kind: RegionKind::LineComment,
        start: "--",
        end: "\n",
        escape: None,
    },
    IgnoredRegion {
        kind: RegionKind::BlockComment,
        start: "/*",
        end: "*/",
        escape: None,
    },
];

/// If an ignored region opens in `sql[cursor..candidate]`, return the offset just past
/// its end. The region opening first wins.
///
/// # Errors
/// Returns `ParseError::UnterminatedRegion` when a string, identifier or block comment
/// never closes. A line comment without a trailing newline runs to end of text.
pub(super) fn skip_ignored_region(
    sql: &str,
    cursor: usize,
    candidate: usize,
) -> Result<Option<usize>, ParseError> {
    let window = &sql[cursor..candidate];
    let opening = IGNORED_REGIONS
        .iter()
        .filter_map(|region| window.find(region.start).map(|at| (cursor + at, region)))
        .min_by_key(|(at, _)| *at);

    let Some((start, region)) = opening else {
        return Ok(None);
    };

    let bytes = sql.as_bytes();
    let mut from = start + region.start.len();
    loop {
        let Some(found) = sql[from..].find(region.end).map(|at| from + at) else {
            if region.kind == RegionKind::LineComment {
                return Ok(Some(sql.len()));
            }
            return Err(ParseError::UnterminatedRegion {
                region: region.kind,
                offset: start,
            });
        };
        let after = found + region.end.len();
        match region.escape {
            Some(escape) if bytes.get(after) == Some(&escape) => from = after + 1,
            _ => return Ok(Some(after)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_region_before_candidate() {
        let sql = "select ? from t";
        assert_eq!(skip_ignored_region(sql, 0, 7), Ok(None));
    }

    #[test]
    fn skips_string_to_closing_quote() {
        let sql = "select '?' , ?";
        assert_eq!(skip_ignored_region(sql, 0, 8), Ok(Some(10)));
    }

    #[test]
    fn doubled_identifier_quote_stays_inside() {
        let sql = r#"select "a"":b" , :c"#;
        assert_eq!(skip_ignored_region(sql, 0, 11), Ok(Some(14)));
    }

    #[test]
    fn earliest_region_wins() {
        let sql = r#"select "it's" , '?'"#;
        assert_eq!(skip_ignored_region(sql, 0, 17), Ok(Some(13)));
    }

    #[test]
    fn line_comment_runs_to_end_of_text() {
        let sql = "select 1 -- ?";
        assert_eq!(skip_ignored_region(sql, 0, 12), Ok(Some(sql.len())));
    }

    #[test]
    fn unterminated_block_comment_fails() {
        let sql = "select /* ? ";
        assert_eq!(
            skip_ignored_region(sql, 0, 10),
            Err(ParseError::UnterminatedRegion {
                region: RegionKind::BlockComment,
                offset: 7,
            })
        );
    }
}
