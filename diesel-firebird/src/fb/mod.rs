//! Provides types and functions related to working with Firebird
//!
//! Much of what a diesel application touches is re-exported from database
//! agnostic locations. However, if you are writing code specifically to
//! extend diesel on Firebird, you may need to work with this module
//! directly.

pub(crate) mod backend;
mod connection;
pub mod ddl;
pub mod expression;
pub mod identifier;
mod metadata;
pub(crate) mod query_builder;
pub mod reflection;
mod transaction;
mod types;
mod value;

pub use self::backend::{Fb, FbEmptyFromClauseSyntax, FbReturningClause, FbSelectStatementSyntax};
pub use self::connection::{FbConnection, FbCursor};
pub use self::metadata::{FbDialectInfo, SqlGrammar};
pub use self::query_builder::FbQueryBuilder;
pub use self::transaction::FbTransactionManager;
pub use self::types::SupportedType;
pub use self::value::{FbField, FbRow, FbValue};
