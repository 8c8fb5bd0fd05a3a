// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::data::ColumnData;
use reifydb_type::{Type, Value};

/// One named column inside a `Block`.
///
/// `is_const` marks a column whose `data` physically holds a single row
/// but is logically broadcast across the block's row count -- the same
/// distinction spec.md §3 draws between a COLUMN node's "true constant
/// column" and a "materialized source column".
#[derive(Clone, Debug)]
pub struct Column {
	pub name: String,
	pub data: ColumnData,
	pub is_const: bool,
}

impl Column {
	pub fn full(name: impl Into<String>, data: ColumnData) -> Column {
		Column { name: name.into(), data, is_const: false }
	}

	pub fn constant(name: impl Into<String>, value: Value) -> Column {
		Column { name: name.into(), data: ColumnData::from_value(&value), is_const: true }
	}

	pub fn data_type(&self) -> Type {
		self.data.data_type()
	}

	/// How many rows this column contributes, given the block's overall
	/// row count (constants don't carry their own count).
	pub fn row_count(&self, block_row_count: usize) -> usize {
		if self.is_const { block_row_count } else { self.data.len() }
	}

	pub fn value_at(&self, row: usize) -> Value {
		if self.is_const { self.data.get(0) } else { self.data.get(row) }
	}

	/// Replicate this column's rows per `indices`. A constant column is
	/// unchanged -- its single logical value still applies to every
	/// output row.
	pub fn take(&self, indices: &[usize]) -> Column {
		if self.is_const {
			self.clone()
		} else {
			Column { name: self.name.clone(), data: self.data.take(indices), is_const: false }
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_constant_broadcasts_value() {
		let col = Column::constant("k", Value::Int4(2));
		assert_eq!(col.value_at(0), Value::Int4(2));
		assert_eq!(col.value_at(99), Value::Int4(2));
		assert_eq!(col.row_count(5), 5);
	}

	#[test]
	fn test_take_leaves_constant_untouched() {
		let col = Column::constant("k", Value::Int4(2));
		let taken = col.take(&[0, 0, 0]);
		assert!(taken.is_const);
		assert_eq!(taken.value_at(0), Value::Int4(2));
	}
}
