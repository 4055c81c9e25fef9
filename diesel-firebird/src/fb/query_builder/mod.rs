//! The Firebird query builder

use diesel::query_builder::QueryBuilder;
use diesel::QueryResult;

use super::backend::Fb;
use super::identifier;
use super::metadata::SqlGrammar;

mod query_fragment_impls;

/// Collects generated SQL text for one statement.
///
/// Besides the plain string assembly this watches the token stream for two
/// things: a `RETURNING` keyword (such statements must be executed through
/// the driver's returnable-statement call instead of opening a cursor), and,
/// in legacy grammar, the alias `AS` keyword, which dialect-1 servers reject.
pub struct FbQueryBuilder {
    query: String,
    grammar: SqlGrammar,
    /// Whether the finished statement opens a cursor when executed.
    pub has_cursor: bool,
}

impl FbQueryBuilder {
    /// Constructs a new query builder speaking the current grammar.
    pub fn new() -> Self {
        Self::with_grammar(SqlGrammar::Current)
    }

    /// Constructs a new query builder speaking the given grammar.
    pub fn with_grammar(grammar: SqlGrammar) -> Self {
        FbQueryBuilder {
            query: String::new(),
            grammar,
            has_cursor: true,
        }
    }
}

impl Default for FbQueryBuilder {
    fn default() -> Self {
        FbQueryBuilder::new()
    }
}

impl QueryBuilder<Fb> for FbQueryBuilder {
    fn push_sql(&mut self, sql: &str) {
        if sql.trim().eq_ignore_ascii_case("returning") {
            self.has_cursor = false;
        }

        // Dialect-1 servers do not accept the AS keyword between a table
        // expression and its alias; diesel pushes it as a standalone token.
        if self.grammar == SqlGrammar::Legacy && sql == " AS " {
            self.query.push(' ');
            return;
        }

        self.query.push_str(sql);
    }

    fn push_identifier(&mut self, identifier: &str) -> QueryResult<()> {
        if identifier::requires_quotes(identifier) {
            self.query.push('"');
            self.query.push_str(&identifier.replace('"', "\"\""));
            self.query.push('"');
        } else {
            self.query.push_str(identifier);
        }

        Ok(())
    }

    fn push_bind_param(&mut self) {
        self.query.push('?');
    }

    fn finish(self) -> String {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted_only_when_needed() {
        let mut qb = FbQueryBuilder::new();
        qb.push_identifier("employee").unwrap();
        qb.push_sql(".");
        qb.push_identifier("order").unwrap();
        qb.push_sql(".");
        qb.push_identifier("MyColumn").unwrap();
        assert_eq!(qb.finish(), r#"employee."order"."MyColumn""#);
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        let mut qb = FbQueryBuilder::new();
        qb.push_identifier(r#"odd"name"#).unwrap();
        assert_eq!(qb.finish(), r#""odd""name""#);
    }

    #[test]
    fn returning_keyword_disables_the_cursor() {
        let mut qb = FbQueryBuilder::new();
        qb.push_sql("UPDATE employee SET salary = ?");
        assert!(qb.has_cursor);
        qb.push_sql(" RETURNING ");
        assert!(!qb.has_cursor);
    }

    #[test]
    fn legacy_grammar_drops_the_alias_keyword() {
        let mut qb = FbQueryBuilder::with_grammar(SqlGrammar::Legacy);
        qb.push_identifier("employee").unwrap();
        qb.push_sql(" AS ");
        qb.push_identifier("e").unwrap();
        assert_eq!(qb.finish(), "employee e");

        let mut qb = FbQueryBuilder::new();
        qb.push_identifier("employee").unwrap();
        qb.push_sql(" AS ");
        qb.push_identifier("e").unwrap();
        assert_eq!(qb.finish(), "employee AS e");
    }
}
