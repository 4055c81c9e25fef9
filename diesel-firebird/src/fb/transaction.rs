//! The Firebird transaction manager

use diesel::connection::{
    Connection, InTransactionStatus, SimpleConnection, TransactionDepthChange, TransactionManager,
    TransactionManagerStatus, ValidTransactionManagerStatus,
};
use diesel::result::Error::DatabaseError;
use diesel::result::{DatabaseErrorKind, Error, QueryResult};
use std::num::NonZeroU32;

use super::connection::FbConnection;

/// Maps diesel's transaction protocol onto the driver's primitives.
///
/// Top-level begin/commit/rollback go straight to the underlying simple
/// connection, whose commit and rollback use the *retaining* variants of the
/// server call: the finished transaction's visibility scope ends, but the
/// connection immediately continues inside a fresh transaction context
/// instead of dropping out of one, saving the explicit restart round-trip.
/// Nested [`Connection::transaction`] calls map to `SAVEPOINT` statements.
#[derive(Debug, Default)]
pub struct FbTransactionManager {
    pub(crate) status: TransactionManagerStatus,
}

impl FbTransactionManager {
    /// A manager with no transaction open.
    pub fn new() -> Self {
        Self::default()
    }

    fn get_transaction_state(
        conn: &mut FbConnection,
    ) -> QueryResult<&mut ValidTransactionManagerStatus> {
        conn.transaction_state().status.transaction_state()
    }

    fn fb_err(e: rsfbclient::FbError) -> Error {
        DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
    }
}

impl TransactionManager<FbConnection> for FbTransactionManager {
    type TransactionStateData = Self;

    fn begin_transaction(conn: &mut FbConnection) -> QueryResult<()> {
        let transaction_state = Self::get_transaction_state(conn)?;
        match transaction_state.transaction_depth() {
            None => conn.raw.begin_transaction().map_err(Self::fb_err)?,
            Some(depth) => conn.batch_execute(&format!("SAVEPOINT fb_savepoint_{depth}"))?,
        }
        Self::get_transaction_state(conn)?
            .change_transaction_depth(TransactionDepthChange::IncreaseDepth)?;

        Ok(())
    }

    fn rollback_transaction(conn: &mut FbConnection) -> QueryResult<()> {
        let transaction_state = Self::get_transaction_state(conn)?;

        let (
            (rollback_sql, rolling_back_top_level),
            requires_rollback_maybe_up_to_top_level_before_execute,
        ) = match transaction_state.in_transaction {
            Some(ref in_transaction) => (
                match in_transaction.transaction_depth.get() {
                    1 => (None, true),
                    depth_gt1 => (
                        Some(format!(
                            "ROLLBACK TO SAVEPOINT fb_savepoint_{}",
                            depth_gt1 - 1
                        )),
                        false,
                    ),
                },
                in_transaction.requires_rollback_maybe_up_to_top_level,
            ),
            None => return Err(Error::NotInTransaction),
        };

        let result = match rollback_sql {
            None => conn.raw.rollback().map_err(Self::fb_err),
            Some(sql) => conn.batch_execute(&sql),
        };

        match result {
            Ok(()) => {
                match Self::get_transaction_state(conn)?
                    .change_transaction_depth(TransactionDepthChange::DecreaseDepth)
                {
                    Ok(()) => {}
                    Err(Error::NotInTransaction) if rolling_back_top_level => {
                        // Transaction exit may have already been detected by
                        // the connection. It's fine.
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
            Err(rollback_error) => {
                let tm_status = Self::transaction_manager_status_mut(conn);
                match tm_status {
                    TransactionManagerStatus::Valid(ValidTransactionManagerStatus {
                        in_transaction:
                            Some(InTransactionStatus {
                                transaction_depth,
                                requires_rollback_maybe_up_to_top_level,
                                ..
                            }),
                        ..
                    }) if transaction_depth.get() > 1 => {
                        // A savepoint failed to roll back; the outer levels
                        // may still be repairable. Decrement anyway so the
                        // caller's begin/commit/rollback pairing stays
                        // consistent.
                        *transaction_depth = NonZeroU32::new(transaction_depth.get() - 1)
                            .expect("Depth was checked to be > 1");
                        *requires_rollback_maybe_up_to_top_level = true;
                        if requires_rollback_maybe_up_to_top_level_before_execute {
                            // In that case a failed savepoint release is
                            // tolerated.
                            return Ok(());
                        }
                    }
                    TransactionManagerStatus::Valid(ValidTransactionManagerStatus {
                        in_transaction: None,
                        ..
                    }) => {
                        // We would have returned `NotInTransaction` if that
                        // had been the state before our call, so the
                        // underlying connection already fixed itself.
                    }
                    _ => tm_status.set_in_error(),
                }
                Err(rollback_error)
            }
        }
    }

    /// If a top-level commit fails and the transaction is marked as requiring
    /// a rollback, a rollback is attempted; if that fails too, the connection
    /// is considered broken (it holds an open transaction that can neither
    /// commit nor abort).
    fn commit_transaction(conn: &mut FbConnection) -> QueryResult<()> {
        let transaction_state = Self::get_transaction_state(conn)?;
        let transaction_depth = transaction_state.transaction_depth();
        let (commit_sql, committing_top_level) = match transaction_depth {
            None => return Err(Error::NotInTransaction),
            Some(depth) if depth.get() == 1 => (None, true),
            Some(depth) => (
                Some(format!("RELEASE SAVEPOINT fb_savepoint_{}", depth.get() - 1)),
                false,
            ),
        };

        let result = match commit_sql {
            None => conn.raw.commit().map_err(Self::fb_err),
            Some(sql) => conn.batch_execute(&sql),
        };

        match result {
            Ok(()) => {
                match Self::get_transaction_state(conn)?
                    .change_transaction_depth(TransactionDepthChange::DecreaseDepth)
                {
                    Ok(()) => {}
                    Err(Error::NotInTransaction) if committing_top_level => {
                        // Transaction exit may have already been detected by
                        // the connection. It's fine.
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
            Err(commit_error) => {
                if let TransactionManagerStatus::Valid(ValidTransactionManagerStatus {
                    in_transaction:
                        Some(InTransactionStatus {
                            requires_rollback_maybe_up_to_top_level: true,
                            ..
                        }),
                    ..
                }) = conn.transaction_state().status
                {
                    match Self::rollback_transaction(conn) {
                        Ok(()) => {}
                        Err(rollback_error) => {
                            conn.transaction_state().status.set_in_error();
                            return Err(Error::RollbackErrorOnCommit {
                                rollback_error: Box::new(rollback_error),
                                commit_error: Box::new(commit_error),
                            });
                        }
                    }
                }
                Err(commit_error)
            }
        }
    }

    fn transaction_manager_status_mut(conn: &mut FbConnection) -> &mut TransactionManagerStatus {
        &mut conn.transaction_state().status
    }
}
