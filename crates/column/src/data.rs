// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::cowvec::CowVec;
use reifydb_type::{Type, Value};

/// Typed columnar storage. Array columns are stored flattened: `offsets`
/// has `row_count + 1` entries (Arrow-style), `data` holds every element of
/// every row back to back. This is the "column/block runtime" spec.md §1
/// treats as an external collaborator.
#[derive(Clone, Debug)]
pub enum ColumnData {
	Boolean(CowVec<bool>),
	Float4(CowVec<f32>),
	Float8(CowVec<f64>),
	Int1(CowVec<i8>),
	Int2(CowVec<i16>),
	Int4(CowVec<i32>),
	Int8(CowVec<i64>),
	Int16(CowVec<i128>),
	Uint1(CowVec<u8>),
	Uint2(CowVec<u16>),
	Uint4(CowVec<u32>),
	Uint8(CowVec<u64>),
	Uint16(CowVec<u128>),
	Utf8(CowVec<String>),
	Array {
		element: Box<Type>,
		offsets: CowVec<u32>,
		data: Box<ColumnData>,
	},
	/// A run of undefined (NULL) values; carries only its length.
	Undefined(usize),
}

macro_rules! ctor {
	($name:ident, $variant:ident, $t:ty) => {
		pub fn $name(values: impl Into<Vec<$t>>) -> ColumnData {
			ColumnData::$variant(CowVec::new(values.into()))
		}
	};
}

impl ColumnData {
	ctor!(bool, Boolean, bool);
	ctor!(float4, Float4, f32);
	ctor!(float8, Float8, f64);
	ctor!(int1, Int1, i8);
	ctor!(int2, Int2, i16);
	ctor!(int4, Int4, i32);
	ctor!(int8, Int8, i64);
	ctor!(int16, Int16, i128);
	ctor!(uint1, Uint1, u8);
	ctor!(uint2, Uint2, u16);
	ctor!(uint4, Uint4, u32);
	ctor!(uint8, Uint8, u64);
	ctor!(uint16, Uint16, u128);
	ctor!(utf8, Utf8, String);

	pub fn undefined(len: usize) -> ColumnData {
		ColumnData::Undefined(len)
	}

	pub fn data_type(&self) -> Type {
		match self {
			ColumnData::Boolean(_) => Type::Boolean,
			ColumnData::Float4(_) => Type::Float4,
			ColumnData::Float8(_) => Type::Float8,
			ColumnData::Int1(_) => Type::Int1,
			ColumnData::Int2(_) => Type::Int2,
			ColumnData::Int4(_) => Type::Int4,
			ColumnData::Int8(_) => Type::Int8,
			ColumnData::Int16(_) => Type::Int16,
			ColumnData::Uint1(_) => Type::Uint1,
			ColumnData::Uint2(_) => Type::Uint2,
			ColumnData::Uint4(_) => Type::Uint4,
			ColumnData::Uint8(_) => Type::Uint8,
			ColumnData::Uint16(_) => Type::Uint16,
			ColumnData::Utf8(_) => Type::Utf8,
			ColumnData::Array { element, .. } => Type::Array(element.clone()),
			ColumnData::Undefined(_) => Type::Undefined,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ColumnData::Boolean(v) => v.len(),
			ColumnData::Float4(v) => v.len(),
			ColumnData::Float8(v) => v.len(),
			ColumnData::Int1(v) => v.len(),
			ColumnData::Int2(v) => v.len(),
			ColumnData::Int4(v) => v.len(),
			ColumnData::Int8(v) => v.len(),
			ColumnData::Int16(v) => v.len(),
			ColumnData::Uint1(v) => v.len(),
			ColumnData::Uint2(v) => v.len(),
			ColumnData::Uint4(v) => v.len(),
			ColumnData::Uint8(v) => v.len(),
			ColumnData::Uint16(v) => v.len(),
			ColumnData::Utf8(v) => v.len(),
			ColumnData::Array { offsets, .. } => offsets.len().saturating_sub(1),
			ColumnData::Undefined(len) => *len,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Build an array column from per-row element vectors.
	pub fn array(element: Type, rows: Vec<Vec<Value>>) -> ColumnData {
		let mut offsets = Vec::with_capacity(rows.len() + 1);
		offsets.push(0u32);
		let mut flat = Vec::new();
		for row in rows {
			flat.extend(row);
			offsets.push(flat.len() as u32);
		}
		let data = ColumnData::from_values(&element, flat);
		ColumnData::Array { element: Box::new(element), offsets: CowVec::new(offsets), data: Box::new(data) }
	}

	/// The array elements for `row`, as raw `(start, end)` bounds into
	/// the flattened child column. Panics if `self` is not `Array`.
	pub fn array_bounds(&self, row: usize) -> (usize, usize) {
		match self {
			ColumnData::Array { offsets, .. } => {
				let start = *offsets.get(row).expect("row out of bounds") as usize;
				let end = *offsets.get(row + 1).expect("row out of bounds") as usize;
				(start, end)
			}
			other => panic!("array_bounds called on non-array column: {other:?}"),
		}
	}

	pub fn get(&self, row: usize) -> Value {
		match self {
			ColumnData::Boolean(v) => v.get(row).map(|b| Value::Boolean(*b)).unwrap_or(Value::Undefined),
			ColumnData::Float4(v) => v.get(row).map(|f| Value::float4(*f)).unwrap_or(Value::Undefined),
			ColumnData::Float8(v) => v.get(row).map(|f| Value::float8(*f)).unwrap_or(Value::Undefined),
			ColumnData::Int1(v) => v.get(row).map(|i| Value::Int1(*i)).unwrap_or(Value::Undefined),
			ColumnData::Int2(v) => v.get(row).map(|i| Value::Int2(*i)).unwrap_or(Value::Undefined),
			ColumnData::Int4(v) => v.get(row).map(|i| Value::Int4(*i)).unwrap_or(Value::Undefined),
			ColumnData::Int8(v) => v.get(row).map(|i| Value::Int8(*i)).unwrap_or(Value::Undefined),
			ColumnData::Int16(v) => v.get(row).map(|i| Value::Int16(*i)).unwrap_or(Value::Undefined),
			ColumnData::Uint1(v) => v.get(row).map(|i| Value::Uint1(*i)).unwrap_or(Value::Undefined),
			ColumnData::Uint2(v) => v.get(row).map(|i| Value::Uint2(*i)).unwrap_or(Value::Undefined),
			ColumnData::Uint4(v) => v.get(row).map(|i| Value::Uint4(*i)).unwrap_or(Value::Undefined),
			ColumnData::Uint8(v) => v.get(row).map(|i| Value::Uint8(*i)).unwrap_or(Value::Undefined),
			ColumnData::Uint16(v) => v.get(row).map(|i| Value::Uint16(*i)).unwrap_or(Value::Undefined),
			ColumnData::Utf8(v) => v.get(row).map(|s| Value::Utf8(s.clone())).unwrap_or(Value::Undefined),
			ColumnData::Array { element, .. } => {
				let (start, end) = self.array_bounds(row);
				let ColumnData::Array { data, .. } = self else { unreachable!() };
				let values = (start..end).map(|i| data.get(i)).collect();
				Value::Array((**element).clone(), values)
			}
			ColumnData::Undefined(_) => Value::Undefined,
		}
	}

	/// Gather rows by index, producing a new column of `indices.len()`
	/// rows. Used to replicate a block's columns in lockstep with an
	/// ARRAY_JOIN expansion.
	pub fn take(&self, indices: &[usize]) -> ColumnData {
		match self {
			ColumnData::Boolean(v) => ColumnData::bool(gather(v.as_slice(), indices)),
			ColumnData::Float4(v) => ColumnData::float4(gather(v.as_slice(), indices)),
			ColumnData::Float8(v) => ColumnData::float8(gather(v.as_slice(), indices)),
			ColumnData::Int1(v) => ColumnData::int1(gather(v.as_slice(), indices)),
			ColumnData::Int2(v) => ColumnData::int2(gather(v.as_slice(), indices)),
			ColumnData::Int4(v) => ColumnData::int4(gather(v.as_slice(), indices)),
			ColumnData::Int8(v) => ColumnData::int8(gather(v.as_slice(), indices)),
			ColumnData::Int16(v) => ColumnData::int16(gather(v.as_slice(), indices)),
			ColumnData::Uint1(v) => ColumnData::uint1(gather(v.as_slice(), indices)),
			ColumnData::Uint2(v) => ColumnData::uint2(gather(v.as_slice(), indices)),
			ColumnData::Uint4(v) => ColumnData::uint4(gather(v.as_slice(), indices)),
			ColumnData::Uint8(v) => ColumnData::uint8(gather(v.as_slice(), indices)),
			ColumnData::Uint16(v) => ColumnData::uint16(gather(v.as_slice(), indices)),
			ColumnData::Utf8(v) => ColumnData::utf8(gather(v.as_slice(), indices)),
			ColumnData::Undefined(_) => ColumnData::Undefined(indices.len()),
			ColumnData::Array { element, .. } => {
				let rows = indices
					.iter()
					.map(|&row| match self.get(row) {
						Value::Array(_, values) => values,
						_ => unreachable!(),
					})
					.collect();
				ColumnData::array((**element).clone(), rows)
			}
		}
	}

	/// Build a column of `element`-typed scalars from a flat `Vec<Value>`
	/// -- the inverse of [`ColumnData::array`]'s flattening, used to
	/// materialize the unfolded output of an `ARRAY_JOIN`.
	pub fn from_values(element: &Type, values: Vec<Value>) -> ColumnData {
		if values.is_empty() {
			return ColumnData::undefined(0).cast_empty(element);
		}
		match element {
			Type::Boolean => ColumnData::bool(values.into_iter().map(as_bool).collect::<Vec<_>>()),
			Type::Float4 => ColumnData::float4(values.into_iter().map(as_f32).collect::<Vec<_>>()),
			Type::Float8 => ColumnData::float8(values.into_iter().map(as_f64).collect::<Vec<_>>()),
			Type::Int1 => ColumnData::int1(values.into_iter().map(as_i8).collect::<Vec<_>>()),
			Type::Int2 => ColumnData::int2(values.into_iter().map(as_i16).collect::<Vec<_>>()),
			Type::Int4 => ColumnData::int4(values.into_iter().map(as_i32).collect::<Vec<_>>()),
			Type::Int8 => ColumnData::int8(values.into_iter().map(as_i64).collect::<Vec<_>>()),
			Type::Int16 => ColumnData::int16(values.into_iter().map(as_i128).collect::<Vec<_>>()),
			Type::Uint1 => ColumnData::uint1(values.into_iter().map(as_u8).collect::<Vec<_>>()),
			Type::Uint2 => ColumnData::uint2(values.into_iter().map(as_u16).collect::<Vec<_>>()),
			Type::Uint4 => ColumnData::uint4(values.into_iter().map(as_u32).collect::<Vec<_>>()),
			Type::Uint8 => ColumnData::uint8(values.into_iter().map(as_u64).collect::<Vec<_>>()),
			Type::Uint16 => ColumnData::uint16(values.into_iter().map(as_u128).collect::<Vec<_>>()),
			Type::Utf8 => ColumnData::utf8(values.into_iter().map(as_utf8).collect::<Vec<_>>()),
			Type::Array(inner) => {
				let rows = values
					.into_iter()
					.map(|v| match v {
						Value::Array(_, vs) => vs,
						_ => vec![],
					})
					.collect();
				ColumnData::array((**inner).clone(), rows)
			}
			Type::Undefined => ColumnData::Undefined(values.len()),
		}
	}

	fn cast_empty(self, element: &Type) -> ColumnData {
		match element {
			Type::Boolean => ColumnData::bool(Vec::<bool>::new()),
			Type::Float4 => ColumnData::float4(Vec::<f32>::new()),
			Type::Float8 => ColumnData::float8(Vec::<f64>::new()),
			Type::Int1 => ColumnData::int1(Vec::<i8>::new()),
			Type::Int2 => ColumnData::int2(Vec::<i16>::new()),
			Type::Int4 => ColumnData::int4(Vec::<i32>::new()),
			Type::Int8 => ColumnData::int8(Vec::<i64>::new()),
			Type::Int16 => ColumnData::int16(Vec::<i128>::new()),
			Type::Uint1 => ColumnData::uint1(Vec::<u8>::new()),
			Type::Uint2 => ColumnData::uint2(Vec::<u16>::new()),
			Type::Uint4 => ColumnData::uint4(Vec::<u32>::new()),
			Type::Uint8 => ColumnData::uint8(Vec::<u64>::new()),
			Type::Uint16 => ColumnData::uint16(Vec::<u128>::new()),
			Type::Utf8 => ColumnData::utf8(Vec::<String>::new()),
			Type::Array(inner) => ColumnData::array((**inner).clone(), vec![]),
			Type::Undefined => self,
		}
	}

	/// A single-row column holding `value`, used to materialize COLUMN
	/// nodes for literals and folded constants.
	pub fn from_value(value: &Value) -> ColumnData {
		match value {
			Value::Array(element, values) => ColumnData::array(element.clone(), vec![values.clone()]),
			other => ColumnData::from_values(&other.data_type(), vec![other.clone()]),
		}
	}
}

fn gather<T: Clone>(slice: &[T], indices: &[usize]) -> Vec<T> {
	indices.iter().map(|&i| slice[i].clone()).collect()
}

fn as_bool(v: Value) -> bool {
	matches!(v, Value::Boolean(true))
}
fn as_f32(v: Value) -> f32 {
	match v {
		Value::Float4(f) => f.into(),
		_ => 0.0,
	}
}
fn as_f64(v: Value) -> f64 {
	match v {
		Value::Float8(f) => f.into(),
		_ => 0.0,
	}
}
fn as_i8(v: Value) -> i8 {
	match v {
		Value::Int1(i) => i,
		_ => 0,
	}
}
fn as_i16(v: Value) -> i16 {
	match v {
		Value::Int2(i) => i,
		_ => 0,
	}
}
fn as_i32(v: Value) -> i32 {
	match v {
		Value::Int4(i) => i,
		_ => 0,
	}
}
fn as_i64(v: Value) -> i64 {
	match v {
		Value::Int8(i) => i,
		_ => 0,
	}
}
fn as_i128(v: Value) -> i128 {
	match v {
		Value::Int16(i) => i,
		_ => 0,
	}
}
fn as_u8(v: Value) -> u8 {
	match v {
		Value::Uint1(i) => i,
		_ => 0,
	}
}
fn as_u16(v: Value) -> u16 {
	match v {
		Value::Uint2(i) => i,
		_ => 0,
	}
}
fn as_u32(v: Value) -> u32 {
	match v {
		Value::Uint4(i) => i,
		_ => 0,
	}
}
fn as_u64(v: Value) -> u64 {
	match v {
		Value::Uint8(i) => i,
		_ => 0,
	}
}
fn as_u128(v: Value) -> u128 {
	match v {
		Value::Uint16(i) => i,
		_ => 0,
	}
}
fn as_utf8(v: Value) -> String {
	match v {
		Value::Utf8(s) => s,
		_ => String::new(),
	}
}
