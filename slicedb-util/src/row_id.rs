//! Physical row identifiers, packed into 48 bits.
//!
//! A `RowId` mirrors Postgres's `ctid`: a `(block, offset)` pair. We keep the
//! `block<<16 | offset` packing stable so [`crate::row_id_set::RowIdSet`] can
//! store it in a plain sorted array instead of a generic hash set.

use slicedb_errors::{ObjectId, SliceError};

/// Bit width a packed row id must fit within.
pub const ROW_ID_BITS: u32 = 48;

/// A physical row identifier, totally ordered, packed as `block<<16 | offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl RowId {
    /// Builds a `RowId` from a Postgres-style `(block, offset)` pair.
    pub fn from_block_offset(block: u32, offset: u16) -> Self {
        RowId((u64::from(block) << 16) | u64::from(offset))
    }

    /// Builds a `RowId` from an already-packed 48-bit value.
    ///
    /// Fails with a `Configuration`-kind [`SliceError`] if `value` does not
    /// fit in 48 bits.
    pub fn from_packed(value: u64, table: &str) -> Result<Self, SliceError> {
        if value >> ROW_ID_BITS != 0 {
            return Err(SliceError::configuration(
                ObjectId::Table(table.to_string()),
                format!("row id {value} exceeds {ROW_ID_BITS}-bit width"),
            ));
        }
        Ok(RowId(value))
    }

    /// The packed 48-bit representation.
    pub fn packed(self) -> u64 {
        self.0
    }

    pub fn block(self) -> u32 {
        (self.0 >> 16) as u32
    }

    pub fn offset(self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// Renders as Postgres's `(block,offset)` textual `ctid` literal.
    pub fn to_ctid_literal(self) -> String {
        format!("({},{})", self.block(), self.offset())
    }

    /// Parses Postgres's `(block,offset)` textual `ctid` representation, as
    /// returned by `SELECT ctid::text`.
    pub fn from_ctid_text(text: &str, table: &str) -> Result<Self, SliceError> {
        let inner = text
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| {
                SliceError::data(ObjectId::Table(table.to_string()), format!("malformed ctid {text:?}"))
            })?;
        let (block_str, offset_str) = inner.split_once(',').ok_or_else(|| {
            SliceError::data(ObjectId::Table(table.to_string()), format!("malformed ctid {text:?}"))
        })?;
        let block: u32 = block_str
            .parse()
            .map_err(|_| SliceError::data(ObjectId::Table(table.to_string()), format!("malformed ctid {text:?}")))?;
        let offset: u16 = offset_str
            .parse()
            .map_err(|_| SliceError::data(ObjectId::Table(table.to_string()), format!("malformed ctid {text:?}")))?;
        Ok(RowId::from_block_offset(block, offset))
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_ctid_literal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks() {
        let id = RowId::from_block_offset(42, 7);
        assert_eq!(id.block(), 42);
        assert_eq!(id.offset(), 7);
        assert_eq!(id.to_ctid_literal(), "(42,7)");
    }

    #[test]
    fn rejects_oversized_values() {
        let too_big = 1u64 << 48;
        assert!(RowId::from_packed(too_big, "public.foo").is_err());
        assert!(RowId::from_packed(too_big - 1, "public.foo").is_ok());
    }

    #[test]
    fn parses_ctid_text() {
        let id = RowId::from_ctid_text("(42,7)", "public.foo").unwrap();
        assert_eq!(id.block(), 42);
        assert_eq!(id.offset(), 7);
    }

    #[test]
    fn rejects_malformed_ctid_text() {
        assert!(RowId::from_ctid_text("42,7", "public.foo").is_err());
        assert!(RowId::from_ctid_text("(42)", "public.foo").is_err());
    }

    #[test]
    fn orders_by_packed_value() {
        let a = RowId::from_block_offset(1, 0);
        let b = RowId::from_block_offset(1, 1);
        let c = RowId::from_block_offset(2, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
