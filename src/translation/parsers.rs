use std::sync::LazyLock;

use regex::bytes::Regex;

static USER_VARIABLE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[A-Za-z0-9_]+\s*:=$").expect("user variable pattern is valid")
});

/// `SELECT @x:=5` assigns a user variable; the `:` there is not a placeholder.
///
/// Returns the offset to resume scanning from: `pos + 1` when the candidate at `pos`
/// opens a `:=` assignment, `pos` otherwise.
pub(super) fn skip_user_variable(bytes: &[u8], pos: usize) -> usize {
    let Some(at) = bytes[..pos].iter().rposition(|b| *b == b'@') else {
        return pos;
    };
    let end = (pos + 2).min(bytes.len());
    if USER_VARIABLE_ASSIGNMENT.is_match(&bytes[at..end]) {
        pos + 1
    } else {
        pos
    }
}

/// Bind names are either all digits or a letter followed by letters, digits and `_`.
pub(super) fn scan_bind_name(bytes: &[u8], start: usize) -> Option<&str> {
    let first = *bytes.get(start)?;
    let mut idx = start + 1;
    if first.is_ascii_digit() {
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
    } else if first.is_ascii_alphabetic() {
        while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
            idx += 1;
        }
    } else {
        return None;
    }
    std::str::from_utf8(&bytes[start..idx]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_colon_is_skipped() {
        let sql = b"select @x:=5";
        assert_eq!(skip_user_variable(sql, 9), 10);
    }

    #[test]
    fn assignment_allows_space_before_colon() {
        let sql = b"select @total := 5";
        assert_eq!(skip_user_variable(sql, 14), 15);
    }

    #[test]
    fn placeholder_after_assignment_is_kept() {
        let sql = b"select @x:=?";
        assert_eq!(skip_user_variable(sql, 11), 11);
    }

    #[test]
    fn named_placeholder_is_not_an_assignment() {
        let sql = b"select @x, :y";
        assert_eq!(skip_user_variable(sql, 11), 11);
    }

    #[test]
    fn bind_name_grammar() {
        assert_eq!(scan_bind_name(b":name_1 ", 1), Some("name_1"));
        assert_eq!(scan_bind_name(b":12ab", 1), Some("12"));
        assert_eq!(scan_bind_name(b":_x", 1), None);
        assert_eq!(scan_bind_name(b":", 1), None);
    }
}
