use std::collections::HashSet;
use std::sync::Arc;

mod row;

pub use row::Row;
use row::index_columns;

use crate::types::SqlValue;

/// Output keys for a result's columns.
///
/// Names are lower-cased first when `lower` is set; a name already taken gets the
/// smallest numeric suffix that makes it unique, so two `id` columns from a join come
/// back as `id` and `id1`.
#[must_use]
pub fn dedupe_column_names(columns: &[String], lower: bool) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(columns.len());
    let mut out = Vec::with_capacity(columns.len());
    for column in columns {
        let base = if lower {
            column.to_lowercase()
        } else {
            column.clone()
        };
        let mut name = base.clone();
        let mut counter = 1usize;
        while seen.contains(&name) {
            name = format!("{base}{counter}");
            counter += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

/// Turn fetched cells into rows sharing one set of column names.
#[must_use]
pub fn build_rows(column_names: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Vec<Row> {
    let column_names = Arc::new(column_names);
    let column_index = Arc::new(index_columns(&column_names));
    rows.into_iter()
        .map(|values| Row {
            column_names: Arc::clone(&column_names),
            values,
            column_index: Arc::clone(&column_index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn join_duplicates_get_counters() {
        let out = dedupe_column_names(&names(&["id", "name", "id", "id"]), false);
        assert_eq!(out, names(&["id", "name", "id1", "id2"]));
    }

    #[test]
    fn lower_casing_happens_before_dedupe() {
        let out = dedupe_column_names(&names(&["ID", "id"]), true);
        assert_eq!(out, names(&["id", "id1"]));

        let out = dedupe_column_names(&names(&["ID", "id"]), false);
        assert_eq!(out, names(&["ID", "id"]));
    }

    #[test]
    fn suffix_skips_existing_names() {
        let out = dedupe_column_names(&names(&["id", "id1", "id"]), false);
        assert_eq!(out, names(&["id", "id1", "id2"]));
    }

    #[test]
    fn rows_share_column_lookup() {
        let rows = build_rows(
            names(&["id", "id1"]),
            vec![
                vec![SqlValue::Int(1), SqlValue::Int(2)],
                vec![SqlValue::Int(3), SqlValue::Int(4)],
            ],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("id1"), Some(&SqlValue::Int(4)));
        assert!(Arc::ptr_eq(&rows[0].column_names, &rows[1].column_names));
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert_eq!(json, r#"{"id":1,"id1":2}"#);
    }
}
