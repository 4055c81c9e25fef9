//! Firebird-specific expressions
//!
//! The constructs here cover the spots where Firebird's expression grammar
//! departs from ANSI SQL: there is no infix modulo operator, the length
//! function is spelled differently per grammar, substring uses the
//! `FROM`/`FOR` form, and sequence values come from the `gen_id` function.

use diesel::expression::is_aggregate;
use diesel::expression::{
    AppearsOnTable, AsExpression, Expression, MixedAggregates, SelectableExpression, ValidGrouping,
};
use diesel::query_builder::{AstPass, QueryFragment, QueryId};
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::QueryResult;

use super::backend::Fb;
use super::metadata::SqlGrammar;

/// `lhs % rhs`, rendered as a call to the `mod` function.
#[derive(Debug, Clone, Copy)]
pub struct Mod<L, R> {
    left: L,
    right: R,
}

impl<L, R> Expression for Mod<L, R>
where
    L: Expression,
    R: Expression,
{
    type SqlType = L::SqlType;
}

impl<L, R> QueryId for Mod<L, R>
where
    L: QueryId + 'static,
    R: QueryId + 'static,
{
    type QueryId = Mod<L::QueryId, R::QueryId>;

    const HAS_STATIC_QUERY_ID: bool = L::HAS_STATIC_QUERY_ID && R::HAS_STATIC_QUERY_ID;
}

impl<L, R, GB> ValidGrouping<GB> for Mod<L, R>
where
    L: ValidGrouping<GB>,
    R: ValidGrouping<GB>,
    L::IsAggregate: MixedAggregates<R::IsAggregate>,
{
    type IsAggregate = <L::IsAggregate as MixedAggregates<R::IsAggregate>>::Output;
}

impl<L, R, QS> SelectableExpression<QS> for Mod<L, R>
where
    L: SelectableExpression<QS>,
    R: SelectableExpression<QS>,
    Self: AppearsOnTable<QS>,
{
}

impl<L, R, QS> AppearsOnTable<QS> for Mod<L, R>
where
    L: AppearsOnTable<QS>,
    R: AppearsOnTable<QS>,
    Self: Expression,
{
}

impl<L, R> QueryFragment<Fb> for Mod<L, R>
where
    L: QueryFragment<Fb>,
    R: QueryFragment<Fb>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        // No infix modulo; the equivalent function ships with the server's
        // udf library.
        out.push_sql("mod(");
        self.left.walk_ast(out.reborrow())?;
        out.push_sql(", ");
        self.right.walk_ast(out.reborrow())?;
        out.push_sql(")");
        Ok(())
    }
}

/// Methods available on every expression when this backend is in use.
pub trait FbExpressionMethods: Expression + Sized {
    /// The remainder of dividing `self` by `other`, via the `mod` function.
    fn modulo<R>(self, other: R) -> Mod<Self, R::Expression>
    where
        Self::SqlType: diesel::sql_types::SqlType,
        R: AsExpression<Self::SqlType>,
    {
        Mod {
            left: self,
            right: other.as_expression(),
        }
    }
}

impl<T: Expression> FbExpressionMethods for T {}

/// Length of a string in characters.
///
/// Spelled `char_length` in the current grammar and `strlen` on dialect-1
/// servers; the walk picks the spelling from the backend value.
#[derive(Debug, Clone, Copy)]
pub struct CharLength<E> {
    expr: E,
}

/// Counts the characters of `expr`.
pub fn char_length<E>(expr: E) -> CharLength<E::Expression>
where
    E: AsExpression<Text>,
{
    CharLength {
        expr: expr.as_expression(),
    }
}

impl<E> Expression for CharLength<E>
where
    E: Expression,
{
    type SqlType = Integer;
}

impl<E> QueryId for CharLength<E>
where
    E: QueryId + 'static,
{
    type QueryId = CharLength<E::QueryId>;

    const HAS_STATIC_QUERY_ID: bool = E::HAS_STATIC_QUERY_ID;
}

impl<E, GB> ValidGrouping<GB> for CharLength<E>
where
    E: ValidGrouping<GB>,
{
    type IsAggregate = E::IsAggregate;
}

impl<E, QS> SelectableExpression<QS> for CharLength<E>
where
    E: SelectableExpression<QS>,
    Self: AppearsOnTable<QS>,
{
}

impl<E, QS> AppearsOnTable<QS> for CharLength<E>
where
    E: AppearsOnTable<QS>,
    Self: Expression,
{
}

impl<E> QueryFragment<Fb> for CharLength<E>
where
    E: QueryFragment<Fb>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        let grammar = out.backend().grammar();
        match grammar {
            SqlGrammar::Current => out.push_sql("char_length("),
            SqlGrammar::Legacy => out.push_sql("strlen("),
        }
        self.expr.walk_ast(out.reborrow())?;
        out.push_sql(")");
        Ok(())
    }
}

/// `SUBSTRING(source FROM start)`.
#[derive(Debug, Clone, Copy)]
pub struct Substring<S, F> {
    source: S,
    from: F,
}

/// `SUBSTRING(source FROM start FOR count)`.
#[derive(Debug, Clone, Copy)]
pub struct SubstringFor<S, F, C> {
    source: S,
    from: F,
    count: C,
}

/// The substring of `source` starting at the 1-based position `from`.
pub fn substring<S, F>(source: S, from: F) -> Substring<S::Expression, F::Expression>
where
    S: AsExpression<Text>,
    F: AsExpression<BigInt>,
{
    Substring {
        source: source.as_expression(),
        from: from.as_expression(),
    }
}

/// Like [`substring`], limited to `count` characters.
pub fn substring_for<S, F, C>(
    source: S,
    from: F,
    count: C,
) -> SubstringFor<S::Expression, F::Expression, C::Expression>
where
    S: AsExpression<Text>,
    F: AsExpression<BigInt>,
    C: AsExpression<BigInt>,
{
    SubstringFor {
        source: source.as_expression(),
        from: from.as_expression(),
        count: count.as_expression(),
    }
}

impl<S, F> Expression for Substring<S, F>
where
    S: Expression,
    F: Expression,
{
    type SqlType = Text;
}

impl<S, F> QueryId for Substring<S, F>
where
    S: QueryId + 'static,
    F: QueryId + 'static,
{
    type QueryId = Substring<S::QueryId, F::QueryId>;

    const HAS_STATIC_QUERY_ID: bool = S::HAS_STATIC_QUERY_ID && F::HAS_STATIC_QUERY_ID;
}

impl<S, F, GB> ValidGrouping<GB> for Substring<S, F>
where
    S: ValidGrouping<GB>,
    F: ValidGrouping<GB>,
    S::IsAggregate: MixedAggregates<F::IsAggregate>,
{
    type IsAggregate = <S::IsAggregate as MixedAggregates<F::IsAggregate>>::Output;
}

impl<S, F, QS> SelectableExpression<QS> for Substring<S, F>
where
    S: SelectableExpression<QS>,
    F: SelectableExpression<QS>,
    Self: AppearsOnTable<QS>,
{
}

impl<S, F, QS> AppearsOnTable<QS> for Substring<S, F>
where
    S: AppearsOnTable<QS>,
    F: AppearsOnTable<QS>,
    Self: Expression,
{
}

impl<S, F> QueryFragment<Fb> for Substring<S, F>
where
    S: QueryFragment<Fb>,
    F: QueryFragment<Fb>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        out.push_sql("SUBSTRING(");
        self.source.walk_ast(out.reborrow())?;
        out.push_sql(" FROM ");
        self.from.walk_ast(out.reborrow())?;
        out.push_sql(")");
        Ok(())
    }
}

impl<S, F, C> Expression for SubstringFor<S, F, C>
where
    S: Expression,
    F: Expression,
    C: Expression,
{
    type SqlType = Text;
}

impl<S, F, C> QueryId for SubstringFor<S, F, C>
where
    S: QueryId + 'static,
    F: QueryId + 'static,
    C: QueryId + 'static,
{
    type QueryId = SubstringFor<S::QueryId, F::QueryId, C::QueryId>;

    const HAS_STATIC_QUERY_ID: bool =
        S::HAS_STATIC_QUERY_ID && F::HAS_STATIC_QUERY_ID && C::HAS_STATIC_QUERY_ID;
}

impl<S, F, C, GB> ValidGrouping<GB> for SubstringFor<S, F, C>
where
    S: ValidGrouping<GB>,
    F: ValidGrouping<GB>,
    C: ValidGrouping<GB>,
    S::IsAggregate: MixedAggregates<F::IsAggregate>,
    <S::IsAggregate as MixedAggregates<F::IsAggregate>>::Output:
        MixedAggregates<C::IsAggregate>,
{
    type IsAggregate = <<S::IsAggregate as MixedAggregates<F::IsAggregate>>::Output as MixedAggregates<C::IsAggregate>>::Output;
}

impl<S, F, C, QS> SelectableExpression<QS> for SubstringFor<S, F, C>
where
    S: SelectableExpression<QS>,
    F: SelectableExpression<QS>,
    C: SelectableExpression<QS>,
    Self: AppearsOnTable<QS>,
{
}

impl<S, F, C, QS> AppearsOnTable<QS> for SubstringFor<S, F, C>
where
    S: AppearsOnTable<QS>,
    F: AppearsOnTable<QS>,
    C: AppearsOnTable<QS>,
    Self: Expression,
{
}

impl<S, F, C> QueryFragment<Fb> for SubstringFor<S, F, C>
where
    S: QueryFragment<Fb>,
    F: QueryFragment<Fb>,
    C: QueryFragment<Fb>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        out.push_sql("SUBSTRING(");
        self.source.walk_ast(out.reborrow())?;
        out.push_sql(" FROM ");
        self.from.walk_ast(out.reborrow())?;
        out.push_sql(" FOR ");
        self.count.walk_ast(out.reborrow())?;
        out.push_sql(")");
        Ok(())
    }
}

/// The next value of a sequence (generator), `gen_id(<name>, 1)`.
///
/// The `gen_id` spelling works under both grammars, so no switch is needed
/// here, unlike the DDL in [`super::ddl`].
#[derive(Debug, Clone)]
pub struct NextValue {
    sequence: String,
}

/// Increments the named sequence and yields the new value.
pub fn next_value(sequence: &str) -> NextValue {
    NextValue {
        sequence: sequence.to_owned(),
    }
}

impl Expression for NextValue {
    type SqlType = BigInt;
}

impl QueryId for NextValue {
    type QueryId = ();

    // The generated SQL embeds the sequence name.
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl<GB> ValidGrouping<GB> for NextValue {
    type IsAggregate = is_aggregate::Never;
}

impl<QS> SelectableExpression<QS> for NextValue where Self: AppearsOnTable<QS> {}

impl<QS> AppearsOnTable<QS> for NextValue where Self: Expression {}

impl QueryFragment<Fb> for NextValue {
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Fb>) -> QueryResult<()> {
        out.push_sql("gen_id(");
        out.push_identifier(&self.sequence)?;
        out.push_sql(", 1)");
        Ok(())
    }
}
