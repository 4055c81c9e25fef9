//! Runtime inspection of the `RDB$` system catalog
//!
//! One operation per catalog object kind; each runs one or more queries
//! against the system tables and folds the rows into plain records. Every
//! name crossing the driver boundary goes through
//! [`normalize_name`]/[`denormalize_name`], so callers live entirely in the
//! portable lowercase convention.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Nullable, SmallInt, Text};
use diesel::QueryResult;

use super::connection::FbConnection;
use super::identifier::{denormalize_name, normalize_name};
use super::metadata::SqlGrammar;

/// A reflected column type, parameterized from the catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FbColumnType {
    /// `SMALLINT` (catalog name `SHORT`)
    SmallInt,
    /// `BIGINT` (catalog name `LONG`)
    BigInt,
    /// `FLOAT`/`DOUBLE PRECISION` (catalog names `FLOAT`, `DOUBLE`, `QUAD`)
    Float,
    /// `NUMERIC`/`DECIMAL` backed by an `INT64`
    Numeric {
        /// Declared precision, if the catalog records one
        precision: Option<i16>,
        /// Declared scale; the catalog stores it negated
        scale: i16,
    },
    /// `CHAR(n)` (catalog names `TEXT`, `CSTRING`)
    Char {
        /// Length in bytes
        length: Option<i16>,
    },
    /// `VARCHAR(n)` (catalog name `VARYING`)
    VarChar {
        /// Length in bytes
        length: Option<i16>,
    },
    /// `BLOB SUB_TYPE 1`
    Text,
    /// `BLOB` with any non-text sub-type
    Binary,
    /// `DATE`
    Date,
    /// `TIME`
    Time,
    /// `TIMESTAMP` (reflected as [`FbColumnType::Date`] on dialect-1 servers)
    Timestamp,
    /// A native type this adapter does not recognize; reflection warns and
    /// carries on
    Unsupported,
}

/// One reflected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInformation {
    /// Normalized column name
    pub name: String,
    /// The column type, with its parameters resolved
    pub ty: FbColumnType,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// The default expression, with the `DEFAULT ` prefix stripped
    pub default: Option<String>,
    /// The sequence feeding this column through a trigger, when the
    /// single-column-primary-key heuristic finds exactly one
    pub sequence: Option<String>,
}

/// One reflected foreign key, columns in constraint order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    /// Normalized constraint name
    pub name: String,
    /// Constrained columns of the local table
    pub columns: Vec<String>,
    /// The referenced table
    pub referenced_table: String,
    /// Referenced columns, position-matched with `columns`
    pub referenced_columns: Vec<String>,
}

/// One reflected index, excluding those backing keys and constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInformation {
    /// Normalized index name
    pub name: String,
    /// Whether the index enforces uniqueness
    pub unique: bool,
    /// Indexed columns in segment order
    pub columns: Vec<String>,
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct PresentRow {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    #[allow(dead_code)]
    present: i32,
}

#[derive(QueryableByName)]
struct SourceRow {
    #[diesel(sql_type = Nullable<Text>)]
    source: Option<String>,
}

#[derive(QueryableByName)]
struct PrimaryKeyRow {
    #[diesel(sql_type = Text)]
    fname: String,
}

#[derive(QueryableByName)]
struct GeneratorRow {
    #[diesel(sql_type = Text)]
    fgenerator: String,
}

#[derive(QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    fname: String,
    #[diesel(sql_type = Nullable<SmallInt>)]
    null_flag: Option<i16>,
    #[diesel(sql_type = Text)]
    ftype: String,
    #[diesel(sql_type = Nullable<SmallInt>)]
    stype: Option<i16>,
    #[diesel(sql_type = Nullable<SmallInt>)]
    flen: Option<i16>,
    #[diesel(sql_type = Nullable<SmallInt>)]
    fprec: Option<i16>,
    #[diesel(sql_type = Nullable<SmallInt>)]
    fscale: Option<i16>,
    #[diesel(sql_type = Nullable<Text>)]
    fdefault: Option<String>,
}

#[derive(QueryableByName)]
struct ForeignKeyRow {
    #[diesel(sql_type = Text)]
    cname: String,
    #[diesel(sql_type = Text)]
    fname: String,
    #[diesel(sql_type = Text)]
    targetrname: String,
    #[diesel(sql_type = Text)]
    targetfname: String,
}

#[derive(QueryableByName)]
struct IndexRow {
    #[diesel(sql_type = Text)]
    index_name: String,
    #[diesel(sql_type = Nullable<SmallInt>)]
    unique_flag: Option<i16>,
    #[diesel(sql_type = Text)]
    field_name: String,
}

/// Whether a table with the given name exists, views included.
#[tracing::instrument(skip(conn))]
pub fn table_exists(conn: &mut FbConnection, table_name: &str) -> QueryResult<bool> {
    let Some(name) = denormalize_name(table_name) else {
        return Ok(false);
    };
    let rows: Vec<PresentRow> = sql_query(
        "SELECT 1 AS present FROM RDB$DATABASE \
         WHERE EXISTS (SELECT RDB$RELATION_NAME \
                       FROM RDB$RELATIONS \
                       WHERE RDB$RELATION_NAME = ?)",
    )
    .bind::<Text, _>(name)
    .load(conn)?;
    Ok(!rows.is_empty())
}

/// Whether a sequence (generator) with the given name exists.
#[tracing::instrument(skip(conn))]
pub fn sequence_exists(conn: &mut FbConnection, sequence_name: &str) -> QueryResult<bool> {
    let Some(name) = denormalize_name(sequence_name) else {
        return Ok(false);
    };
    let rows: Vec<PresentRow> = sql_query(
        "SELECT 1 AS present FROM RDB$DATABASE \
         WHERE EXISTS (SELECT RDB$GENERATOR_NAME \
                       FROM RDB$GENERATORS \
                       WHERE RDB$GENERATOR_NAME = ?)",
    )
    .bind::<Text, _>(name)
    .load(conn)?;
    Ok(!rows.is_empty())
}

/// Every user table name, normalized.
#[tracing::instrument(skip(conn))]
pub fn table_names(conn: &mut FbConnection) -> QueryResult<Vec<String>> {
    let rows: Vec<NameRow> = sql_query(
        "SELECT DISTINCT RDB$RELATION_NAME AS name \
         FROM RDB$RELATION_FIELDS \
         WHERE RDB$SYSTEM_FLAG = 0 AND RDB$VIEW_CONTEXT IS NULL",
    )
    .load(conn)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| normalize_name(&row.name))
        .collect())
}

/// Every view name, normalized.
#[tracing::instrument(skip(conn))]
pub fn view_names(conn: &mut FbConnection) -> QueryResult<Vec<String>> {
    let rows: Vec<NameRow> = sql_query(
        "SELECT DISTINCT RDB$VIEW_NAME AS name \
         FROM RDB$VIEW_RELATIONS",
    )
    .load(conn)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| normalize_name(&row.name))
        .collect())
}

/// The stored source text of a view, verbatim, or `None` if there is no such
/// view.
#[tracing::instrument(skip(conn))]
pub fn view_definition(conn: &mut FbConnection, view_name: &str) -> QueryResult<Option<String>> {
    let Some(name) = denormalize_name(view_name) else {
        return Ok(None);
    };
    let rows: Vec<SourceRow> = sql_query(
        "SELECT RDB$VIEW_SOURCE AS source \
         FROM RDB$RELATIONS \
         WHERE RDB$RELATION_NAME = ?",
    )
    .bind::<Text, _>(name)
    .load(conn)?;
    Ok(rows.into_iter().next().and_then(|row| row.source))
}

/// The primary key columns of a table, in constraint order.
#[tracing::instrument(skip(conn))]
pub fn primary_key_columns(conn: &mut FbConnection, table_name: &str) -> QueryResult<Vec<String>> {
    let Some(name) = denormalize_name(table_name) else {
        return Ok(vec![]);
    };
    let rows: Vec<PrimaryKeyRow> = sql_query(
        "SELECT se.RDB$FIELD_NAME AS fname \
         FROM RDB$RELATION_CONSTRAINTS rc \
              JOIN RDB$INDEX_SEGMENTS se ON rc.RDB$INDEX_NAME = se.RDB$INDEX_NAME \
         WHERE rc.RDB$CONSTRAINT_TYPE = ? AND rc.RDB$RELATION_NAME = ? \
         ORDER BY se.RDB$FIELD_POSITION",
    )
    .bind::<Text, _>("PRIMARY KEY")
    .bind::<Text, _>(name)
    .load(conn)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| normalize_name(&row.fname))
        .collect())
}

/// The generator feeding a column through an insert trigger, if any.
///
/// Best-effort heuristic over the dependency catalog: it looks for a
/// before-insert trigger that depends on exactly the target table and field
/// plus exactly one generator — two dependencies in total, which isolates
/// triggers existing solely to pull the next sequence value into that column.
/// Zero matches and ambiguous matches both yield `None`.
#[tracing::instrument(skip(conn))]
pub fn column_sequence(
    conn: &mut FbConnection,
    table_name: &str,
    column_name: &str,
) -> QueryResult<Option<String>> {
    let (Some(table), Some(column)) = (denormalize_name(table_name), denormalize_name(column_name))
    else {
        return Ok(None);
    };
    let rows: Vec<GeneratorRow> = sql_query(
        "SELECT trigdep.RDB$DEPENDED_ON_NAME AS fgenerator \
         FROM RDB$DEPENDENCIES tabdep \
              JOIN RDB$DEPENDENCIES trigdep \
                   ON tabdep.RDB$DEPENDENT_NAME = trigdep.RDB$DEPENDENT_NAME \
                      AND trigdep.RDB$DEPENDED_ON_TYPE = 14 \
                      AND trigdep.RDB$DEPENDENT_TYPE = 2 \
              JOIN RDB$TRIGGERS trig ON trig.RDB$TRIGGER_NAME = tabdep.RDB$DEPENDENT_NAME \
         WHERE tabdep.RDB$DEPENDED_ON_NAME = ? \
           AND tabdep.RDB$DEPENDED_ON_TYPE = 0 \
           AND trig.RDB$TRIGGER_TYPE = 1 \
           AND tabdep.RDB$FIELD_NAME = ? \
           AND (SELECT count(*) \
                FROM RDB$DEPENDENCIES trigdep2 \
                WHERE trigdep2.RDB$DEPENDENT_NAME = trigdep.RDB$DEPENDENT_NAME) = 2",
    )
    .bind::<Text, _>(table)
    .bind::<Text, _>(column)
    .load(conn)?;

    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (Some(row), None) => Ok(normalize_name(&row.fgenerator)),
        _ => Ok(None),
    }
}

/// All columns of a table, in field position order.
///
/// The primary key is resolved first: when it consists of a single column,
/// the sequence-linkage heuristic runs for that column and the result is
/// attached inline.
#[tracing::instrument(skip(conn))]
pub fn columns(conn: &mut FbConnection, table_name: &str) -> QueryResult<Vec<ColumnInformation>> {
    let Some(name) = denormalize_name(table_name) else {
        return Ok(vec![]);
    };
    let pkey_cols = primary_key_columns(conn, table_name)?;
    let grammar = conn.dialect_info().grammar();

    let rows: Vec<ColumnRow> = sql_query(
        "SELECT DISTINCT r.RDB$FIELD_NAME AS fname, \
                         r.RDB$NULL_FLAG AS null_flag, \
                         t.RDB$TYPE_NAME AS ftype, \
                         f.RDB$FIELD_SUB_TYPE AS stype, \
                         f.RDB$FIELD_LENGTH AS flen, \
                         f.RDB$FIELD_PRECISION AS fprec, \
                         f.RDB$FIELD_SCALE AS fscale, \
                         COALESCE(r.RDB$DEFAULT_SOURCE, f.RDB$DEFAULT_SOURCE) AS fdefault \
         FROM RDB$RELATION_FIELDS r \
              JOIN RDB$FIELDS f ON r.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME \
              JOIN RDB$TYPES t \
                   ON t.RDB$TYPE = f.RDB$FIELD_TYPE AND t.RDB$FIELD_NAME = 'RDB$FIELD_TYPE' \
         WHERE f.RDB$SYSTEM_FLAG = 0 AND r.RDB$RELATION_NAME = ? \
         ORDER BY r.RDB$FIELD_POSITION",
    )
    .bind::<Text, _>(name)
    .load(conn)?;

    let mut cols = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(name) = normalize_name(&row.fname) else {
            continue;
        };
        let ty = derive_column_type(&name, &row, grammar);
        let default = row
            .fdefault
            .as_deref()
            .map(|source| strip_default_prefix(source).to_owned());

        // A single-column primary key may be fed by a generator through a
        // trigger; attach it so callers see the autoincrement pattern.
        let sequence = if pkey_cols.len() == 1 && name == pkey_cols[0] {
            column_sequence(conn, table_name, &name)?
        } else {
            None
        };

        cols.push(ColumnInformation {
            name,
            ty,
            nullable: row.null_flag.unwrap_or(0) == 0,
            default,
            sequence,
        });
    }
    Ok(cols)
}

/// All foreign keys of a table, grouped by constraint.
#[tracing::instrument(skip(conn))]
pub fn foreign_keys(
    conn: &mut FbConnection,
    table_name: &str,
) -> QueryResult<Vec<ForeignKeyConstraint>> {
    let Some(name) = denormalize_name(table_name) else {
        return Ok(vec![]);
    };
    let rows: Vec<ForeignKeyRow> = sql_query(
        "SELECT rc.RDB$CONSTRAINT_NAME AS cname, \
                cse.RDB$FIELD_NAME AS fname, \
                ix2.RDB$RELATION_NAME AS targetrname, \
                se.RDB$FIELD_NAME AS targetfname \
         FROM RDB$RELATION_CONSTRAINTS rc \
              JOIN RDB$INDICES ix1 ON ix1.RDB$INDEX_NAME = rc.RDB$INDEX_NAME \
              JOIN RDB$INDICES ix2 ON ix2.RDB$INDEX_NAME = ix1.RDB$FOREIGN_KEY \
              JOIN RDB$INDEX_SEGMENTS cse ON cse.RDB$INDEX_NAME = ix1.RDB$INDEX_NAME \
              JOIN RDB$INDEX_SEGMENTS se \
                   ON se.RDB$INDEX_NAME = ix2.RDB$INDEX_NAME \
                      AND se.RDB$FIELD_POSITION = cse.RDB$FIELD_POSITION \
         WHERE rc.RDB$CONSTRAINT_TYPE = ? AND rc.RDB$RELATION_NAME = ? \
         ORDER BY se.RDB$INDEX_NAME, se.RDB$FIELD_POSITION",
    )
    .bind::<Text, _>("FOREIGN KEY")
    .bind::<Text, _>(name)
    .load(conn)?;

    Ok(fold_foreign_keys(rows))
}

/// All plain indexes of a table.
///
/// Indexes backing named constraints and foreign keys are excluded; those
/// surface through [`primary_key_columns`] and [`foreign_keys`] instead.
#[tracing::instrument(skip(conn))]
pub fn indexes(conn: &mut FbConnection, table_name: &str) -> QueryResult<Vec<IndexInformation>> {
    let Some(name) = denormalize_name(table_name) else {
        return Ok(vec![]);
    };
    let rows: Vec<IndexRow> = sql_query(
        "SELECT ix.RDB$INDEX_NAME AS index_name, \
                ix.RDB$UNIQUE_FLAG AS unique_flag, \
                ic.RDB$FIELD_NAME AS field_name \
         FROM RDB$INDICES ix \
              JOIN RDB$INDEX_SEGMENTS ic ON ix.RDB$INDEX_NAME = ic.RDB$INDEX_NAME \
              LEFT OUTER JOIN RDB$RELATION_CONSTRAINTS rc \
                   ON rc.RDB$INDEX_NAME = ic.RDB$INDEX_NAME \
         WHERE ix.RDB$RELATION_NAME = ? AND ix.RDB$FOREIGN_KEY IS NULL \
           AND rc.RDB$CONSTRAINT_TYPE IS NULL \
         ORDER BY index_name, field_name",
    )
    .bind::<Text, _>(name)
    .load(conn)?;

    Ok(fold_indexes(rows))
}

fn derive_column_type(column: &str, row: &ColumnRow, grammar: SqlGrammar) -> FbColumnType {
    match row.ftype.trim_end() {
        "SHORT" => FbColumnType::SmallInt,
        "LONG" => FbColumnType::BigInt,
        "QUAD" | "FLOAT" | "DOUBLE" => FbColumnType::Float,
        "DATE" => FbColumnType::Date,
        "TIME" => FbColumnType::Time,
        // Dialect 1 has no TIMESTAMP type; what the catalog calls TIMESTAMP
        // there behaves as a date.
        "TIMESTAMP" => match grammar {
            SqlGrammar::Current => FbColumnType::Timestamp,
            SqlGrammar::Legacy => FbColumnType::Date,
        },
        // The catalog stores the scale negated.
        "INT64" => FbColumnType::Numeric {
            precision: row.fprec,
            scale: -row.fscale.unwrap_or(0),
        },
        "VARYING" => FbColumnType::VarChar { length: row.flen },
        "CSTRING" | "TEXT" => FbColumnType::Char { length: row.flen },
        "BLOB" => {
            if row.stype == Some(1) {
                FbColumnType::Text
            } else {
                FbColumnType::Binary
            }
        }
        unknown => {
            tracing::warn!(column, native = unknown, "did not recognize column type");
            FbColumnType::Unsupported
        }
    }
}

/// Strip the fixed `DEFAULT ` prefix off a default-source catalog string.
///
/// The catalog documents the stored form as `DEFAULT <expression>`; anything
/// else means a corrupted catalog or an unanticipated server version, which
/// is a contract violation, not a recoverable condition.
fn strip_default_prefix(source: &str) -> &str {
    let prefix_ok = source
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("DEFAULT "));
    assert!(prefix_ok, "malformed RDB$DEFAULT_SOURCE: {source:?}");
    &source[8..]
}

fn fold_foreign_keys(rows: Vec<ForeignKeyRow>) -> Vec<ForeignKeyConstraint> {
    let mut constraints: Vec<ForeignKeyConstraint> = Vec::new();
    for row in rows {
        let Some(name) = normalize_name(&row.cname) else {
            continue;
        };
        let idx = match constraints.iter().position(|fk| fk.name == name) {
            Some(idx) => idx,
            None => {
                constraints.push(ForeignKeyConstraint {
                    name,
                    columns: Vec::new(),
                    referenced_table: normalize_name(&row.targetrname).unwrap_or_default(),
                    referenced_columns: Vec::new(),
                });
                constraints.len() - 1
            }
        };
        let fk = &mut constraints[idx];
        fk.columns.extend(normalize_name(&row.fname));
        fk.referenced_columns.extend(normalize_name(&row.targetfname));
    }
    constraints
}

fn fold_indexes(rows: Vec<IndexRow>) -> Vec<IndexInformation> {
    let mut indexes: Vec<IndexInformation> = Vec::new();
    for row in rows {
        let Some(name) = normalize_name(&row.index_name) else {
            continue;
        };
        let idx = match indexes.iter().position(|index| index.name == name) {
            Some(idx) => idx,
            None => {
                indexes.push(IndexInformation {
                    name,
                    unique: row.unique_flag.unwrap_or(0) != 0,
                    columns: Vec::new(),
                });
                indexes.len() - 1
            }
        };
        indexes[idx].columns.extend(normalize_name(&row.field_name));
    }
    indexes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_row(ftype: &str) -> ColumnRow {
        ColumnRow {
            fname: "EMP_NO".into(),
            null_flag: None,
            ftype: ftype.into(),
            stype: None,
            flen: None,
            fprec: None,
            fscale: None,
            fdefault: None,
        }
    }

    #[test]
    fn int64_columns_become_numeric_with_inverted_scale() {
        let mut row = column_row("INT64");
        row.fprec = Some(10);
        row.fscale = Some(-2);
        assert_eq!(
            derive_column_type("salary", &row, SqlGrammar::Current),
            FbColumnType::Numeric {
                precision: Some(10),
                scale: 2,
            }
        );
    }

    #[test]
    fn catalog_type_names_are_padded() {
        // RDB$TYPE_NAME is a fixed-length CHAR; the pad spaces must not
        // defeat the lookup.
        let row = column_row("VARYING                        ");
        assert_eq!(
            derive_column_type("name", &row, SqlGrammar::Current),
            FbColumnType::VarChar { length: None }
        );
    }

    #[test]
    fn blob_sub_type_one_is_text_everything_else_binary() {
        let mut row = column_row("BLOB");
        row.stype = Some(1);
        assert_eq!(
            derive_column_type("notes", &row, SqlGrammar::Current),
            FbColumnType::Text
        );
        row.stype = Some(0);
        assert_eq!(
            derive_column_type("image", &row, SqlGrammar::Current),
            FbColumnType::Binary
        );
        row.stype = None;
        assert_eq!(
            derive_column_type("image", &row, SqlGrammar::Current),
            FbColumnType::Binary
        );
    }

    #[test]
    fn timestamps_reflect_as_dates_on_legacy_servers() {
        let row = column_row("TIMESTAMP");
        assert_eq!(
            derive_column_type("hired", &row, SqlGrammar::Current),
            FbColumnType::Timestamp
        );
        assert_eq!(
            derive_column_type("hired", &row, SqlGrammar::Legacy),
            FbColumnType::Date
        );
    }

    #[test]
    fn unknown_types_degrade_to_unsupported() {
        let row = column_row("BbMATRIX");
        assert_eq!(
            derive_column_type("weird", &row, SqlGrammar::Current),
            FbColumnType::Unsupported
        );
    }

    #[test]
    fn default_sources_lose_their_prefix() {
        assert_eq!(strip_default_prefix("DEFAULT 0"), "0");
        assert_eq!(strip_default_prefix("default 'abc'"), "'abc'");
        assert_eq!(strip_default_prefix("DEFAULT CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
    }

    #[test]
    #[should_panic(expected = "malformed RDB$DEFAULT_SOURCE")]
    fn malformed_default_sources_are_a_contract_violation() {
        strip_default_prefix("0");
    }

    #[test]
    fn foreign_key_rows_group_by_constraint_in_order() {
        let rows = vec![
            ForeignKeyRow {
                cname: "FK_JOB".into(),
                fname: "JOB_CODE".into(),
                targetrname: "JOB".into(),
                targetfname: "JOB_CODE".into(),
            },
            ForeignKeyRow {
                cname: "FK_JOB".into(),
                fname: "JOB_GRADE".into(),
                targetrname: "JOB".into(),
                targetfname: "JOB_GRADE".into(),
            },
            ForeignKeyRow {
                cname: "FK_DEPT".into(),
                fname: "DEPT_NO".into(),
                targetrname: "DEPARTMENT".into(),
                targetfname: "DEPT_NO".into(),
            },
        ];

        let fks = fold_foreign_keys(rows);
        assert_eq!(fks.len(), 2);
        assert_eq!(fks[0].name, "fk_job");
        assert_eq!(fks[0].referenced_table, "job");
        assert_eq!(fks[0].columns, ["job_code", "job_grade"]);
        assert_eq!(fks[0].referenced_columns, ["job_code", "job_grade"]);
        assert_eq!(fks[1].name, "fk_dept");
        assert_eq!(fks[1].columns, ["dept_no"]);
    }

    #[test]
    fn index_rows_group_by_index() {
        let rows = vec![
            IndexRow {
                index_name: "NAMEX".into(),
                unique_flag: Some(1),
                field_name: "FIRST_NAME".into(),
            },
            IndexRow {
                index_name: "NAMEX".into(),
                unique_flag: Some(1),
                field_name: "LAST_NAME".into(),
            },
            IndexRow {
                index_name: "BUDGETX".into(),
                unique_flag: None,
                field_name: "BUDGET".into(),
            },
        ];

        let indexes = fold_indexes(rows);
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "namex");
        assert!(indexes[0].unique);
        assert_eq!(indexes[0].columns, ["first_name", "last_name"]);
        assert_eq!(indexes[1].name, "budgetx");
        assert!(!indexes[1].unique);
    }
}

#[cfg(test)]
mod live {
    use super::*;
    use diesel::connection::SimpleConnection;
    use diesel::Connection;
    use std::env;

    fn connection() -> FbConnection {
        dotenvy::dotenv().ok();

        let connection_url = env::var("FIREBIRD_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .expect("FIREBIRD_DATABASE_URL must be set in order to run live tests");
        FbConnection::establish(&connection_url).unwrap()
    }

    #[test]
    #[ignore = "needs a running Firebird server"]
    fn reflects_columns_keys_and_sequence_linkage() {
        let mut conn = connection();

        conn.batch_execute(
            "RECREATE TABLE employee ( \
                 emp_no BIGINT NOT NULL PRIMARY KEY, \
                 full_name VARCHAR(60) NOT NULL, \
                 salary NUMERIC(10, 2) DEFAULT 0, \
                 notes BLOB SUB_TYPE 1)",
        )
        .unwrap();
        conn.drop_sequence("gen_employee_id").ok();
        conn.create_sequence("gen_employee_id").unwrap();
        conn.batch_execute(
            "CREATE TRIGGER bi_employee FOR employee \
             ACTIVE BEFORE INSERT \
             AS BEGIN \
                 IF (NEW.emp_no IS NULL) THEN \
                     NEW.emp_no = GEN_ID(gen_employee_id, 1); \
             END",
        )
        .unwrap();

        assert!(table_exists(&mut conn, "employee").unwrap());
        assert!(sequence_exists(&mut conn, "gen_employee_id").unwrap());
        assert!(table_names(&mut conn)
            .unwrap()
            .contains(&"employee".to_owned()));

        assert_eq!(
            primary_key_columns(&mut conn, "employee").unwrap(),
            ["emp_no"]
        );

        let cols = columns(&mut conn, "employee").unwrap();
        assert_eq!(cols[0].name, "emp_no");
        assert_eq!(cols[0].ty, FbColumnType::BigInt);
        assert!(!cols[0].nullable);
        assert_eq!(cols[0].sequence.as_deref(), Some("gen_employee_id"));
        assert_eq!(cols[2].ty, FbColumnType::Numeric { precision: Some(10), scale: 2 });
        assert_eq!(cols[2].default.as_deref(), Some("0"));
        assert_eq!(cols[3].ty, FbColumnType::Text);
    }

    #[test]
    #[ignore = "needs a running Firebird server"]
    fn reflects_views_and_next_sequence_value() {
        let mut conn = connection();

        conn.batch_execute(
            "RECREATE TABLE project ( \
                 proj_id BIGINT NOT NULL PRIMARY KEY, \
                 proj_name VARCHAR(60) NOT NULL)",
        )
        .unwrap();
        conn.batch_execute(
            "RECREATE VIEW project_names (proj_name) AS \
             SELECT proj_name FROM project",
        )
        .unwrap();
        conn.drop_sequence("gen_project_id").ok();
        conn.create_sequence("gen_project_id").unwrap();

        assert!(view_names(&mut conn)
            .unwrap()
            .contains(&"project_names".to_owned()));
        let source = view_definition(&mut conn, "project_names")
            .unwrap()
            .unwrap();
        assert!(source.contains("SELECT proj_name FROM project"));
        assert_eq!(view_definition(&mut conn, "no_such_view").unwrap(), None);

        let first = conn.next_sequence_value("gen_project_id").unwrap();
        let second = conn.next_sequence_value("gen_project_id").unwrap();
        assert_eq!(second, first + 1);
    }
}
