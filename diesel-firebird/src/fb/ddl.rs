//! Sequence DDL
//!
//! Sequences predate the `SEQUENCE` spelling here: dialect-1 servers only
//! know `CREATE GENERATOR`/`DROP GENERATOR`. The statements below pick the
//! spelling from the backend value, so the same code works against both.

use diesel::query_builder::{AstPass, QueryFragment, QueryId};
use diesel::QueryResult;

use super::backend::Fb;
use super::metadata::SqlGrammar;

/// A `CREATE SEQUENCE` / `CREATE GENERATOR` statement.
#[derive(Debug, Clone)]
pub struct CreateSequenceStatement {
    name: String,
}

/// A `DROP SEQUENCE` / `DROP GENERATOR` statement.
#[derive(Debug, Clone)]
pub struct DropSequenceStatement {
    name: String,
}

/// Creates the named sequence.
pub fn create_sequence(name: &str) -> CreateSequenceStatement {
    CreateSequenceStatement {
        name: name.to_owned(),
    }
}

/// Drops the named sequence.
pub fn drop_sequence(name: &str) -> DropSequenceStatement {
    DropSequenceStatement {
        name: name.to_owned(),
    }
}

impl QueryFragment<Fb> for CreateSequenceStatement {
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        let grammar = out.backend().grammar();
        match grammar {
            SqlGrammar::Current => out.push_sql("CREATE SEQUENCE "),
            SqlGrammar::Legacy => out.push_sql("CREATE GENERATOR "),
        }
        out.push_identifier(&self.name)
    }
}

impl QueryId for CreateSequenceStatement {
    type QueryId = ();

    const HAS_STATIC_QUERY_ID: bool = false;
}

impl QueryFragment<Fb> for DropSequenceStatement {
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        let grammar = out.backend().grammar();
        match grammar {
            SqlGrammar::Current => out.push_sql("DROP SEQUENCE "),
            SqlGrammar::Legacy => out.push_sql("DROP GENERATOR "),
        }
        out.push_identifier(&self.name)
    }
}

impl QueryId for DropSequenceStatement {
    type QueryId = ();

    const HAS_STATIC_QUERY_ID: bool = false;
}
