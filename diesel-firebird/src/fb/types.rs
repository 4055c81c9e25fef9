//! Types implementation of Firebird support

use std::io::Write;

use bytes::{Buf, Bytes};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use diesel::deserialize::{self, FromSql};
use diesel::result::Error::DatabaseError;
use diesel::result::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::{self, HasSqlType};
use rsfbclient::{ColumnToVal, IntoParam, SqlType};

use super::backend::Fb;
use super::metadata::SqlGrammar;
use super::value::FbValue;

/// The logical types this backend knows how to transfer.
///
/// Doubles as the bind metadata: the raw bytes collected for a bind get
/// decoded back into a driver parameter according to this tag, see
/// [`SupportedType::into_param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SupportedType {
    Text,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    Bool,
    Blob,
}

impl SupportedType {
    /// Decode a collected bind buffer into a driver parameter.
    pub fn into_param(self, source_val: Option<Vec<u8>>) -> SqlType {
        let Some(val) = source_val else {
            return SqlType::Null;
        };

        match self {
            SupportedType::Text => String::from_utf8(val).expect("Invalid UTF-8").into_param(),
            SupportedType::SmallInt => Bytes::copy_from_slice(&val).get_i16().into_param(),
            SupportedType::Int => Bytes::copy_from_slice(&val).get_i32().into_param(),
            SupportedType::BigInt => Bytes::copy_from_slice(&val).get_i64().into_param(),
            SupportedType::Float => Bytes::copy_from_slice(&val).get_f32().into_param(),
            SupportedType::Double => Bytes::copy_from_slice(&val).get_f64().into_param(),
            SupportedType::Date => {
                let days = Bytes::copy_from_slice(&val).get_i32();
                NaiveDate::from_num_days_from_ce_opt(days).into_param()
            }
            SupportedType::Time => {
                let secs = Bytes::copy_from_slice(&val).get_u32();
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).into_param()
            }
            SupportedType::DateTime => {
                let tms = Bytes::copy_from_slice(&val).get_i64();
                DateTime::from_timestamp(tms, 0)
                    .map(|s| s.naive_utc())
                    .into_param()
            }
            // There is no native boolean column type here; booleans live in
            // SMALLINT columns as 1/0.
            SupportedType::Bool => {
                (Bytes::copy_from_slice(&val).get_i8() as i16).into_param()
            }
            SupportedType::Blob => val.into_param(),
        }
    }

    /// The column type name this logical type compiles to in DDL.
    pub fn sql_type_name(self, grammar: SqlGrammar) -> &'static str {
        match self {
            SupportedType::Text => "BLOB SUB_TYPE 1",
            SupportedType::SmallInt => "SMALLINT",
            SupportedType::Int => "INTEGER",
            SupportedType::BigInt => "BIGINT",
            SupportedType::Float => "FLOAT",
            SupportedType::Double => "DOUBLE PRECISION",
            SupportedType::Date => "DATE",
            SupportedType::Time => "TIME",
            // Dialect-1 servers spell their timestamp type DATE.
            SupportedType::DateTime => match grammar {
                SqlGrammar::Current => "TIMESTAMP",
                SqlGrammar::Legacy => "DATE",
            },
            SupportedType::Bool => "SMALLINT",
            SupportedType::Blob => "BLOB SUB_TYPE 0",
        }
    }
}

macro_rules! has_sql_type {
    ($($sql_type:ty => $variant:ident,)+) => {
        $(
            impl HasSqlType<$sql_type> for Fb {
                fn metadata(_: &mut Self::MetadataLookup) -> Self::TypeMetadata {
                    SupportedType::$variant
                }
            }
        )+
    };
}

has_sql_type! {
    sql_types::SmallInt => SmallInt,
    sql_types::Integer => Int,
    sql_types::BigInt => BigInt,
    sql_types::Float => Float,
    sql_types::Double => Double,
    sql_types::VarChar => Text,
    sql_types::Binary => Blob,
    sql_types::Date => Date,
    sql_types::Time => Time,
    sql_types::Timestamp => DateTime,
    sql_types::Bool => Bool,
}

macro_rules! from_sql_via_driver {
    ($($sql_type:ty => $target:ty,)+) => {
        $(
            impl FromSql<$sql_type, Fb> for $target {
                fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
                    let rs = value.raw.clone().to_val().map_err(|e| {
                        DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
                    })?;

                    Ok(rs)
                }
            }
        )+
    };
}

from_sql_via_driver! {
    sql_types::SmallInt => i16,
    sql_types::Integer => i32,
    sql_types::BigInt => i64,
    sql_types::Float => f32,
    sql_types::Double => f64,
    sql_types::VarChar => String,
    sql_types::Binary => Vec<u8>,
}

macro_rules! to_sql_be_bytes {
    ($($sql_type:ty => $target:ty,)+) => {
        $(
            impl ToSql<$sql_type, Fb> for $target {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
                    out.write_all(&self.to_be_bytes())
                        .map(|_| IsNull::No)
                        .map_err(Into::into)
                }
            }
        )+
    };
}

to_sql_be_bytes! {
    sql_types::SmallInt => i16,
    sql_types::Integer => i32,
    sql_types::BigInt => i64,
    sql_types::Float => f32,
    sql_types::Double => f64,
}

impl FromSql<sql_types::Bool, Fb> for bool {
    fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
        // Booleans travel in SMALLINT columns; any nonzero value is true.
        let rs: i32 = value.raw.clone().to_val().map_err(|e| {
            DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
        })?;

        Ok(rs != 0)
    }
}

impl ToSql<sql_types::Bool, Fb> for bool {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
        let bo = (*self as i8).to_be_bytes();
        out.write_all(&bo)
            .map(|_| IsNull::No)
            .map_err(Into::into)
    }
}

impl FromSql<sql_types::Date, Fb> for NaiveDate {
    fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
        let rs = value.raw.clone().to_val().map_err(|e| {
            DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
        })?;

        Ok(rs)
    }
}

impl ToSql<sql_types::Date, Fb> for NaiveDate {
    fn to_sql<'b>(&self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
        use chrono::Datelike;

        let days = self.num_days_from_ce().to_be_bytes();
        out.write_all(&days)
            .map(|_| IsNull::No)
            .map_err(Into::into)
    }
}

impl FromSql<sql_types::Time, Fb> for NaiveTime {
    fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
        let rs = value.raw.clone().to_val().map_err(|e| {
            DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
        })?;

        Ok(rs)
    }
}

impl ToSql<sql_types::Time, Fb> for NaiveTime {
    fn to_sql<'b>(&self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
        let secs = self.num_seconds_from_midnight().to_be_bytes();
        out.write_all(&secs)
            .map(|_| IsNull::No)
            .map_err(Into::into)
    }
}

impl FromSql<sql_types::Timestamp, Fb> for chrono::NaiveDateTime {
    fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
        let rs = value.raw.clone().to_val().map_err(|e| {
            DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
        })?;

        Ok(rs)
    }
}

impl ToSql<sql_types::Timestamp, Fb> for chrono::NaiveDateTime {
    fn to_sql<'b>(&self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
        let tms = self.and_utc().timestamp().to_be_bytes();
        out.write_all(&tms)
            .map(|_| IsNull::No)
            .map_err(Into::into)
    }
}

#[cfg(feature = "time")]
mod time_impls {
    use super::*;
    use time::{Date, PrimitiveDateTime, Time};

    impl FromSql<sql_types::Date, Fb> for Date {
        fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
            use chrono::Datelike;

            let rs: NaiveDate = value.raw.clone().to_val().map_err(|e| {
                DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
            })?;
            let td = Date::from_ordinal_date(rs.year(), rs.ordinal() as u16)?;
            Ok(td)
        }
    }

    impl ToSql<sql_types::Date, Fb> for Date {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
            use chrono::Datelike;

            let naive = NaiveDate::from_yo_opt(self.year(), self.ordinal() as u32)
                .ok_or("date out of range")?;
            let days = naive.num_days_from_ce().to_be_bytes();
            out.write_all(&days)
                .map(|_| IsNull::No)
                .map_err(Into::into)
        }
    }

    impl FromSql<sql_types::Time, Fb> for Time {
        fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
            let rs: NaiveTime = value.raw.clone().to_val().map_err(|e| {
                DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
            })?;
            let time = Time::from_hms(rs.hour() as u8, rs.minute() as u8, rs.second() as u8)?;
            Ok(time)
        }
    }

    impl ToSql<sql_types::Time, Fb> for Time {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
            let secs = NaiveTime::from_hms_opt(
                self.hour() as u32,
                self.minute() as u32,
                self.second() as u32,
            )
            .ok_or("time out of range")?
            .num_seconds_from_midnight()
            .to_be_bytes();
            out.write_all(&secs)
                .map(|_| IsNull::No)
                .map_err(Into::into)
        }
    }

    impl FromSql<sql_types::Timestamp, Fb> for PrimitiveDateTime {
        fn from_sql(value: FbValue<'_>) -> deserialize::Result<Self> {
            use chrono::Datelike;

            let rs: chrono::NaiveDateTime = value.raw.clone().to_val().map_err(|e| {
                DatabaseError(DatabaseErrorKind::Unknown, Box::new(e.to_string()))
            })?;
            let pdt = PrimitiveDateTime::new(
                Date::from_ordinal_date(rs.year(), rs.ordinal() as u16)?,
                Time::from_hms_nano(
                    rs.hour() as u8,
                    rs.minute() as u8,
                    rs.second() as u8,
                    rs.nanosecond(),
                )?,
            );
            Ok(pdt)
        }
    }

    impl ToSql<sql_types::Timestamp, Fb> for PrimitiveDateTime {
        fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Fb>) -> serialize::Result {
            let tms = self.assume_utc().unix_timestamp().to_be_bytes();
            out.write_all(&tms)
                .map(|_| IsNull::No)
                .map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::query_builder::bind_collector::BindCollector;
    use diesel::query_builder::bind_collector::RawBytesBindCollector;

    #[test]
    fn bools_bind_as_one_zero_or_null() {
        let mut binds = RawBytesBindCollector::<Fb>::new();
        binds
            .push_bound_value::<sql_types::Bool, _>(&true, &mut ())
            .unwrap();
        binds
            .push_bound_value::<sql_types::Bool, _>(&false, &mut ())
            .unwrap();
        binds
            .push_bound_value::<sql_types::Nullable<sql_types::Bool>, _>(&None::<bool>, &mut ())
            .unwrap();

        assert_eq!(binds.binds, vec![Some(vec![1]), Some(vec![0]), None]);
    }

    #[test]
    fn bool_params_reach_the_driver_as_small_integers() {
        assert!(matches!(
            SupportedType::Bool.into_param(Some(vec![1])),
            SqlType::Integer(1)
        ));
        assert!(matches!(
            SupportedType::Bool.into_param(Some(vec![0])),
            SqlType::Integer(0)
        ));
        assert!(matches!(
            SupportedType::Bool.into_param(None),
            SqlType::Null
        ));
    }

    #[test]
    fn integer_params_round_trip_through_the_bind_buffer() {
        let param = SupportedType::Int.into_param(Some(417i32.to_be_bytes().to_vec()));
        assert!(matches!(param, SqlType::Integer(417)));

        let param = SupportedType::BigInt.into_param(Some(i64::MIN.to_be_bytes().to_vec()));
        assert!(matches!(param, SqlType::Integer(i64::MIN)));
    }

    #[test]
    fn text_params_round_trip_through_the_bind_buffer() {
        let param = SupportedType::Text.into_param(Some(b"firebird".to_vec()));
        assert!(matches!(param, SqlType::Text(ref s) if s == "firebird"));
    }

    #[test]
    fn ddl_type_names() {
        let current = SqlGrammar::Current;
        assert_eq!(SupportedType::Bool.sql_type_name(current), "SMALLINT");
        assert_eq!(SupportedType::Text.sql_type_name(current), "BLOB SUB_TYPE 1");
        assert_eq!(SupportedType::Blob.sql_type_name(current), "BLOB SUB_TYPE 0");
        assert_eq!(SupportedType::DateTime.sql_type_name(current), "TIMESTAMP");
        // Dialect 1 has no TIMESTAMP; its DATE carries the time part.
        assert_eq!(
            SupportedType::DateTime.sql_type_name(SqlGrammar::Legacy),
            "DATE"
        );
    }
}
