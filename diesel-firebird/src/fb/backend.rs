//! The Firebird backend

use diesel::backend::*;
use diesel::query_builder::bind_collector::RawBytesBindCollector;
use diesel::sql_types::TypeMetadata;

use super::metadata::SqlGrammar;
use super::query_builder::FbQueryBuilder;
use super::types::SupportedType;
use super::value::FbValue;

/// The Firebird backend.
///
/// Carries the SQL grammar the server speaks (dialect 1 vs. dialect 3,
/// detected once per connection), so query fragments that differ between the
/// two can consult [`diesel::query_builder::AstPass::backend`] while walking
/// the AST. The value is immutable after construction.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Default)]
pub struct Fb {
    grammar: SqlGrammar,
}

impl Fb {
    /// Build a backend value speaking the given grammar.
    pub fn with_grammar(grammar: SqlGrammar) -> Self {
        Fb { grammar }
    }

    /// The SQL grammar this backend value generates.
    pub fn grammar(&self) -> SqlGrammar {
        self.grammar
    }
}

impl Backend for Fb {
    type QueryBuilder = FbQueryBuilder;

    type RawValue<'a> = FbValue<'a>;

    type BindCollector<'a> = RawBytesBindCollector<Fb>;
}

impl TrustedBackend for Fb {}
impl DieselReserveSpecialization for Fb {}

impl TypeMetadata for Fb {
    type TypeMetadata = SupportedType;
    // TODO: add firebird domains support
    type MetadataLookup = ();
}

/// Firebird puts `FIRST`/`SKIP` right after the `SELECT` keyword instead of a
/// trailing limit clause, so the whole select statement needs a custom walk.
#[allow(
    missing_docs,
    missing_copy_implementations,
    missing_debug_implementations
)]
pub struct FbSelectStatementSyntax;

#[derive(Debug, Copy, Clone)]
#[allow(missing_docs)]
pub struct FbReturningClause;

/// A select with no table reads from the single-row `RDB$DATABASE` relation.
#[derive(Debug, Copy, Clone)]
#[allow(missing_docs)]
pub struct FbEmptyFromClauseSyntax;

impl SqlDialect for Fb {
    type ReturningClause = FbReturningClause;

    type ConcatClause = sql_dialect::concat_clause::ConcatWithPipesClause;

    type OnConflictClause = sql_dialect::on_conflict_clause::DoesNotSupportOnConflictClause;

    type InsertWithDefaultKeyword =
        sql_dialect::default_keyword_for_insert::DoesNotSupportDefaultKeyword;

    type BatchInsertSupport = sql_dialect::batch_insert_support::DoesNotSupportBatchInsert;

    type DefaultValueClauseForInsert = sql_dialect::default_value_clause::AnsiDefaultValueClause;

    type EmptyFromClauseSyntax = FbEmptyFromClauseSyntax;

    type ExistsSyntax = sql_dialect::exists_syntax::AnsiSqlExistsSyntax;

    type ArrayComparison = sql_dialect::array_comparison::AnsiSqlArrayComparison;

    type SelectStatementSyntax = FbSelectStatementSyntax;

    type AliasSyntax = sql_dialect::alias_syntax::AsAliasSyntax;
}
