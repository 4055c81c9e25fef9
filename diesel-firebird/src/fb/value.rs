//! Firebird row and value representation

use std::ops::Range;

use diesel::row::{Field, PartialRow, Row as DsRow, RowIndex, RowSealed};
pub use rsfbclient::Column;
use rsfbclient::Row as RsRow;

use super::backend::Fb;

/// One non-null value inside a row, borrowed from the driver column.
#[derive(Debug)]
pub struct FbValue<'a> {
    /// The raw driver column
    pub raw: &'a Column,
}

/// One field of a row: the column plus its name.
#[derive(Debug)]
pub struct FbField<'a> {
    raw: &'a Column,
}

impl<'a> Field<'a, Fb> for FbField<'a> {
    fn field_name(&self) -> Option<&'a str> {
        Some(self.raw.name.as_str())
    }

    fn value(&self) -> Option<<Fb as diesel::backend::Backend>::RawValue<'_>> {
        if self.raw.value.is_null() {
            return None;
        }

        Some(FbValue { raw: self.raw })
    }
}

/// A materialized result row.
#[allow(missing_debug_implementations)]
pub struct FbRow {
    raw: RsRow,
}

impl FbRow {
    /// Wraps a driver row.
    pub fn new(row: RsRow) -> Self {
        Self { raw: row }
    }
}

impl RowSealed for FbRow {}

impl<'a> DsRow<'a, Fb> for FbRow {
    type Field<'f>
        = FbField<'f>
    where
        'a: 'f,
        Self: 'f;

    type InnerPartialRow = Self;

    fn field_count(&self) -> usize {
        self.raw.cols.len()
    }

    fn get<'b, I>(&'b self, idx: I) -> Option<Self::Field<'b>>
    where
        'a: 'b,
        Self: RowIndex<I>,
    {
        let idx = self.idx(idx)?;
        self.raw.cols.get(idx).map(|col| FbField { raw: col })
    }

    fn partial_row(&self, range: Range<usize>) -> PartialRow<'_, Self::InnerPartialRow> {
        PartialRow::new(self, range)
    }
}

impl RowIndex<usize> for FbRow {
    fn idx(&self, idx: usize) -> Option<usize> {
        if idx < self.raw.cols.len() {
            Some(idx)
        } else {
            None
        }
    }
}

impl<'a> RowIndex<&'a str> for FbRow {
    // The server reports column names in its own (upper) case; lookups from
    // generated code use the portable lowercase convention.
    fn idx(&self, field_name: &'a str) -> Option<usize> {
        self.raw
            .cols
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(field_name))
    }
}
