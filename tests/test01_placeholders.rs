use sql_helper::prelude::*;

fn rewritten(sql: &str) -> (String, Vec<Placeholder>) {
    let parsed = parse_placeholders(sql).expect("parse");
    let names = parsed.positions.into_iter().map(|t| t.placeholder).collect();
    (parsed.sql, names)
}

#[test]
fn positional_queries_pass_through() {
    let sql = "UPDATE t SET a = ?, b = ? WHERE id = ?";
    let (out, names) = rewritten(sql);
    assert_eq!(out, sql);
    assert_eq!(
        names,
        vec![
            Placeholder::Positional(0),
            Placeholder::Positional(1),
            Placeholder::Positional(2)
        ]
    );
}

#[test]
fn ignored_regions_are_copied_verbatim() {
    let sql = "select ':a', \"x:y\", :b -- :c\n from t where z = :d";
    let (out, names) = rewritten(sql);
    assert_eq!(out, "select ':a', \"x:y\", ? -- :c\n from t where z = ?");
    assert_eq!(
        names,
        vec![Placeholder::Named("b".into()), Placeholder::Named("d".into())]
    );
}

#[test]
fn doubled_quote_inside_identifier_does_not_close_it() {
    let (out, names) = rewritten("select \"a\"\":b\" from t where id = :id");
    assert_eq!(out, "select \"a\"\":b\" from t where id = ?");
    assert_eq!(names, vec![Placeholder::Named("id".into())]);
}

#[test]
fn block_comments_and_trailing_line_comment() {
    let (out, names) = rewritten("select /* ? :x */ :a -- trailing ?");
    assert_eq!(out, "select /* ? :x */ ? -- trailing ?");
    assert_eq!(names, vec![Placeholder::Named("a".into())]);
}

#[test]
fn user_variable_assignment_is_not_a_placeholder() {
    let (out, names) = rewritten("select @x:=?, @total := ?");
    assert_eq!(out, "select @x:=?, @total := ?");
    assert_eq!(
        names,
        vec![Placeholder::Positional(0), Placeholder::Positional(1)]
    );
}

#[test]
fn first_style_wins_and_the_other_is_text() {
    let (out, names) = rewritten("select ?, :a");
    assert_eq!(out, "select ?, :a");
    assert_eq!(names, vec![Placeholder::Positional(0)]);

    let (out, names) = rewritten("select :a, ?");
    assert_eq!(out, "select ?, ?");
    assert_eq!(names, vec![Placeholder::Named("a".into())]);
}

#[test]
fn numeric_bind_names() {
    let (out, names) = rewritten("select :1, :20");
    assert_eq!(out, "select ?, ?");
    assert_eq!(
        names,
        vec![Placeholder::Named("1".into()), Placeholder::Named("20".into())]
    );
}

#[test]
fn offsets_point_at_question_marks_in_rewritten_sql() {
    let parsed = parse_placeholders("insert into t values (:first, 'é', :second)").unwrap();
    assert_eq!(parsed.placeholder_count(), 2);
    for token in &parsed.positions {
        assert_eq!(parsed.sql.as_bytes()[token.offset], b'?');
    }
}

#[test]
fn unterminated_regions_are_errors() {
    assert_eq!(
        parse_placeholders("select 'abc where a = ?"),
        Err(ParseError::UnterminatedRegion {
            region: RegionKind::String,
            offset: 7
        })
    );
    assert!(matches!(
        parse_placeholders("select \"abc = :a"),
        Err(ParseError::UnterminatedRegion {
            region: RegionKind::Identifier,
            ..
        })
    ));
    assert!(matches!(
        parse_placeholders("select /* :a"),
        Err(ParseError::UnterminatedRegion {
            region: RegionKind::BlockComment,
            ..
        })
    ));
}

#[test]
fn colon_without_bind_name_is_an_error() {
    let err = parse_placeholders("select :a, : b").unwrap_err();
    assert_eq!(err, ParseError::InvalidBindName { offset: 11 });
    assert!(err.to_string().contains("bindname"));
}

#[test]
fn binder_resolves_names_then_positions() {
    let parsed = parse_placeholders("select :a, :2, :a").unwrap();
    let args = QueryArgs::new()
        .bind("a", 10_i64)
        .bind(2_usize, "two")
        .bind(1_usize, 2.5);
    let bindings = bind_parameters(&args, &parsed.positions);
    assert_eq!(bindings.signature(), "isi");
    assert_eq!(
        bindings.values(),
        vec![
            &SqlValue::Int(10),
            &SqlValue::Text("two".into()),
            &SqlValue::Int(10)
        ]
    );
}

#[test]
fn binder_drops_unresolved_placeholders() {
    let parsed = parse_placeholders("select ?, ?, ?").unwrap();
    let args = QueryArgs::from(vec![SqlValue::Blob(vec![1, 2])]);
    let bindings = bind_parameters(&args, &parsed.positions);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings.signature(), "b");
}
