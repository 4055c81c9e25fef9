//! The Firebird connection

use diesel::connection::*;
use diesel::expression::QueryMetadata;
use diesel::query_builder::bind_collector::RawBytesBindCollector;
use diesel::query_builder::*;
use diesel::result::Error::DatabaseError;
use diesel::result::*;
use rsfbclient::{Execute, Queryable, Row, SimpleConnection as FbRawConnection, SqlType};

use super::backend::Fb;
use super::ddl;
use super::expression::next_value;
use super::metadata::{self, FbDialectInfo};
use super::query_builder::FbQueryBuilder;
use super::transaction::FbTransactionManager;
use super::value::FbRow;

/// A connection to a Firebird database.
///
/// Establishing runs the one-time version probe and freezes the resulting
/// [`FbDialectInfo`]; everything generated through this connection speaks the
/// grammar detected there.
#[allow(missing_debug_implementations)]
pub struct FbConnection {
    /// The raw driver connection
    pub raw: FbRawConnection,
    fb: Fb,
    dialect_info: FbDialectInfo,
    tr_manager: FbTransactionManager,
    instrumentation: Option<Box<dyn Instrumentation>>,
}

impl SimpleConnection for FbConnection {
    fn batch_execute(&mut self, query: &str) -> QueryResult<()> {
        self.raw
            .execute(query, ())
            .map_err(|e| DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string())))
            .map(|_| ())
    }
}

impl ConnectionSealed for FbConnection {}

impl Connection for FbConnection {
    type TransactionManager = FbTransactionManager;
    type Backend = Fb;

    fn establish(database_url: &str) -> ConnectionResult<Self> {
        let mut raw_builder = rsfbclient::builder_pure_rust();

        let raw = raw_builder
            .from_string(database_url)
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?
            .connect()
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;

        FbConnection::init(raw.into())
    }

    fn execute_returning_count<T>(&mut self, source: &T) -> QueryResult<usize>
    where
        T: QueryFragment<Self::Backend> + QueryId,
    {
        let mut bc = RawBytesBindCollector::<Fb>::new();
        source.collect_binds(&mut bc, &mut (), &self.fb)?;

        let sql = self.build_sql(source)?;

        // The driver wants a (possibly empty) parameter sequence, never an
        // absent one.
        let params: Vec<SqlType> = bc
            .metadata
            .into_iter()
            .zip(bc.binds)
            .map(|(tp, val)| tp.into_param(val))
            .collect();

        self.raw
            .execute(&sql, params)
            .map_err(|e| DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string())))
    }

    fn transaction_state(
        &mut self,
    ) -> &mut <Self::TransactionManager as TransactionManager<Self>>::TransactionStateData {
        &mut self.tr_manager
    }

    fn instrumentation(&mut self) -> &mut dyn Instrumentation {
        &mut self.instrumentation
    }

    fn set_instrumentation(&mut self, instrumentation: impl Instrumentation) {
        self.instrumentation = Some(Box::new(instrumentation));
    }
}

impl LoadConnection<DefaultLoadingMode> for FbConnection {
    type Cursor<'conn, 'query>
        = FbCursor
    where
        Self: 'conn;

    type Row<'conn, 'query>
        = FbRow
    where
        Self: 'conn;

    fn load<'conn, 'query, T>(
        &'conn mut self,
        source: T,
    ) -> QueryResult<Self::Cursor<'conn, 'query>>
    where
        T: Query + QueryFragment<Self::Backend> + QueryId + 'query,
        Self::Backend: QueryMetadata<T::SqlType>,
    {
        let source = &source.as_query();
        let mut bc = RawBytesBindCollector::<Fb>::new();
        source.collect_binds(&mut bc, &mut (), &self.fb)?;

        let mut qb = FbQueryBuilder::with_grammar(self.dialect_info.grammar());
        source.to_sql(&mut qb, &self.fb)?;
        let has_cursor = qb.has_cursor;
        let sql = qb.finish();

        let params: Vec<SqlType> = bc
            .metadata
            .into_iter()
            .zip(bc.binds)
            .map(|(tp, val)| tp.into_param(val))
            .collect();

        // A statement carrying RETURNING cannot open a cursor; it has to go
        // through the driver's returnable-statement call and yields exactly
        // one row.
        let results = if has_cursor {
            self.raw.query::<Vec<SqlType>, Row>(&sql, params)
        } else {
            self.raw
                .execute_returnable::<Vec<SqlType>, Row>(&sql, params)
                .map(|result| vec![result])
        };

        Ok(results
            .map_err(|e| DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string())))?
            .into())
    }
}

#[cfg(feature = "r2d2")]
impl diesel::r2d2::R2D2Connection for FbConnection {
    fn ping(&mut self) -> QueryResult<()> {
        self.batch_execute("SELECT 1 FROM RDB$DATABASE")
    }
}

impl FbConnection {
    /// Create a diesel connection from an already-established driver
    /// connection. Runs the version probe.
    pub fn init(mut raw: FbRawConnection) -> ConnectionResult<Self> {
        let dialect_info = metadata::detect(&mut raw);
        Ok(FbConnection {
            fb: Fb::with_grammar(dialect_info.grammar()),
            raw,
            dialect_info,
            tr_manager: FbTransactionManager::new(),
            instrumentation: None,
        })
    }

    /// The capabilities detected for this connection's server.
    pub fn dialect_info(&self) -> &FbDialectInfo {
        &self.dialect_info
    }

    /// Render one statement in this connection's grammar.
    fn build_sql<T>(&self, source: &T) -> QueryResult<String>
    where
        T: QueryFragment<Fb>,
    {
        let mut qb = FbQueryBuilder::with_grammar(self.dialect_info.grammar());
        source.to_sql(&mut qb, &self.fb)?;
        Ok(qb.finish())
    }

    /// Create the named sequence (`CREATE GENERATOR` on legacy servers).
    pub fn create_sequence(&mut self, name: &str) -> QueryResult<()> {
        let sql = self.build_sql(&ddl::create_sequence(name))?;
        self.batch_execute(&sql)
    }

    /// Drop the named sequence (`DROP GENERATOR` on legacy servers).
    pub fn drop_sequence(&mut self, name: &str) -> QueryResult<()> {
        let sql = self.build_sql(&ddl::drop_sequence(name))?;
        self.batch_execute(&sql)
    }

    /// Pull the next value from the named sequence.
    pub fn next_sequence_value(&mut self, sequence: &str) -> QueryResult<i64> {
        use diesel::RunQueryDsl;

        diesel::select(next_value(sequence)).get_result(self)
    }
}

/// Fully materialized results of one statement.
#[allow(missing_debug_implementations)]
pub struct FbCursor {
    results: std::vec::IntoIter<FbRow>,
}

impl Iterator for FbCursor {
    type Item = QueryResult<FbRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.next().map(Ok)
    }
}

impl From<Vec<Row>> for FbCursor {
    fn from(value: Vec<Row>) -> Self {
        FbCursor {
            results: value
                .into_iter()
                .map(FbRow::new)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}
