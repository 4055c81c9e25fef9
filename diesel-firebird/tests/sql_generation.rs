//! Assertions over the generated SQL text, no server needed.

use diesel::debug_query;
use diesel::prelude::*;
use diesel::query_builder::{QueryBuilder, QueryFragment};

use diesel_firebird::dsl::{
    char_length, create_sequence, drop_sequence, next_value, substring, substring_for,
    FbExpressionMethods,
};
use diesel_firebird::{Fb, FbQueryBuilder, SqlGrammar};

diesel::table! {
    employee (emp_no) {
        emp_no -> BigInt,
        full_name -> Text,
        salary -> Double,
        is_active -> Bool,
    }
}

fn sql_of<T: QueryFragment<Fb>>(query: T) -> String {
    let debugged = debug_query::<Fb, _>(&query).to_string();
    match debugged.split_once(" -- binds:") {
        Some((sql, _)) => sql.to_owned(),
        None => debugged,
    }
}

fn legacy_sql_of<T: QueryFragment<Fb>>(query: T) -> String {
    let backend = Fb::with_grammar(SqlGrammar::Legacy);
    let mut qb = FbQueryBuilder::with_grammar(SqlGrammar::Legacy);
    query.to_sql(&mut qb, &backend).unwrap();
    qb.finish()
}

#[test]
fn limit_and_offset_sit_between_select_and_distinct() {
    let query = employee::table
        .select(employee::emp_no)
        .distinct()
        .limit(5)
        .offset(10);
    let debugged = debug_query::<Fb, _>(&query).to_string();

    assert_eq!(
        sql_of(query),
        "SELECT FIRST ? SKIP ? DISTINCT employee.emp_no FROM employee"
    );
    assert!(debugged.contains("binds: [5, 10]"), "{debugged}");
}

#[test]
fn limit_alone_renders_first() {
    let query = employee::table.select(employee::emp_no).limit(5);
    assert_eq!(
        sql_of(query),
        "SELECT FIRST ? employee.emp_no FROM employee"
    );
}

#[test]
fn offset_alone_renders_skip() {
    let query = employee::table.select(employee::emp_no).offset(10);
    assert_eq!(sql_of(query), "SELECT SKIP ? employee.emp_no FROM employee");
}

#[test]
fn no_trailing_limit_clause_is_ever_emitted() {
    let query = employee::table
        .select(employee::emp_no)
        .limit(5)
        .offset(10);
    let sql = sql_of(query);
    assert!(!sql.contains("LIMIT"), "{sql}");
    assert!(!sql.contains("OFFSET"), "{sql}");
    assert!(sql.ends_with("FROM employee"), "{sql}");
}

#[test]
fn update_appends_returning_after_the_base_statement() {
    let query = diesel::update(employee::table)
        .set(employee::salary.eq(1000.0))
        .returning((employee::emp_no, employee::salary));
    assert_eq!(
        sql_of(query),
        "UPDATE employee SET salary = ? RETURNING employee.emp_no, employee.salary"
    );
}

#[test]
fn insert_and_delete_support_returning() {
    let insert = diesel::insert_into(employee::table)
        .values(employee::full_name.eq("J. Random Hacker"))
        .returning(employee::emp_no);
    let sql = sql_of(insert);
    assert!(sql.ends_with(" RETURNING employee.emp_no"), "{sql}");

    let delete = diesel::delete(employee::table.filter(employee::emp_no.eq(1i64)))
        .returning(employee::emp_no);
    let sql = sql_of(delete);
    assert!(sql.starts_with("DELETE FROM employee"), "{sql}");
    assert!(sql.ends_with(" RETURNING employee.emp_no"), "{sql}");
}

#[test]
fn modulo_rewrites_to_the_mod_function() {
    let query = employee::table.select(employee::emp_no.modulo(7i64));
    assert_eq!(
        sql_of(query),
        "SELECT mod(employee.emp_no, ?) FROM employee"
    );
}

#[test]
fn empty_from_clauses_read_from_rdb_database() {
    let query = diesel::select(char_length("abc"));
    assert_eq!(sql_of(query), "SELECT char_length(?) FROM RDB$DATABASE");
}

#[test]
fn length_function_spelling_follows_the_grammar() {
    assert_eq!(
        legacy_sql_of(diesel::select(char_length("abc"))),
        "SELECT strlen(?) FROM RDB$DATABASE"
    );
}

#[test]
fn substring_uses_the_from_for_form() {
    let query = diesel::select(substring("abcdef", 2i64));
    assert_eq!(
        sql_of(query),
        "SELECT SUBSTRING(? FROM ?) FROM RDB$DATABASE"
    );

    let query = diesel::select(substring_for("abcdef", 2i64, 3i64));
    assert_eq!(
        sql_of(query),
        "SELECT SUBSTRING(? FROM ? FOR ?) FROM RDB$DATABASE"
    );
}

#[test]
fn sequence_next_value_is_a_generator_increment() {
    let query = diesel::select(next_value("gen_employee_id"));
    assert_eq!(
        sql_of(query),
        "SELECT gen_id(gen_employee_id, 1) FROM RDB$DATABASE"
    );
}

#[test]
fn sequence_ddl_follows_the_grammar() {
    let mut qb = FbQueryBuilder::new();
    create_sequence("gen_employee_id")
        .to_sql(&mut qb, &Fb::default())
        .unwrap();
    assert_eq!(qb.finish(), "CREATE SEQUENCE gen_employee_id");

    let mut qb = FbQueryBuilder::new();
    drop_sequence("gen_employee_id")
        .to_sql(&mut qb, &Fb::default())
        .unwrap();
    assert_eq!(qb.finish(), "DROP SEQUENCE gen_employee_id");

    assert_eq!(
        legacy_sql_of(create_sequence("gen_employee_id")),
        "CREATE GENERATOR gen_employee_id"
    );
    assert_eq!(
        legacy_sql_of(drop_sequence("gen_employee_id")),
        "DROP GENERATOR gen_employee_id"
    );
}

#[test]
fn aliases_lose_the_as_keyword_on_legacy_servers() {
    let e2 = diesel::alias!(employee as e2);

    let sql = sql_of(e2.select(e2.field(employee::emp_no)));
    assert!(sql.contains("employee AS e2"), "{sql}");

    let sql = legacy_sql_of(e2.select(e2.field(employee::emp_no)));
    assert!(sql.contains("employee e2"), "{sql}");
    assert!(!sql.contains(" AS "), "{sql}");
}

#[test]
fn reserved_and_mixed_case_column_names_are_quoted() {
    let mut qb = FbQueryBuilder::new();
    diesel::query_builder::QueryBuilder::push_identifier(&mut qb, "order").unwrap();
    diesel::query_builder::QueryBuilder::push_sql(&mut qb, ".");
    diesel::query_builder::QueryBuilder::push_identifier(&mut qb, "Amount").unwrap();
    assert_eq!(qb.finish(), r#""order"."Amount""#);
}
