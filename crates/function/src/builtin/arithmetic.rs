// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::{FunctionError, Result};
use crate::executable::ExecutableFunction;
use crate::resolver::{FunctionBase, FunctionOverloadResolver, Monotonicity};
use reifydb_column::{Column, ColumnData};
use reifydb_type::Type;
use std::sync::Arc;

macro_rules! binary_numeric_op {
	($name:expr, $args:expr, $row_count:expr, $op:tt) => {{
		let lhs = &$args[0];
		let rhs = &$args[1];
		match (&lhs.data, &rhs.data) {
			(ColumnData::Int1(_), ColumnData::Int1(_)) => {
				eval_same_type!($name, lhs, rhs, $row_count, i8, Int1, $op)
			}
			(ColumnData::Int2(_), ColumnData::Int2(_)) => {
				eval_same_type!($name, lhs, rhs, $row_count, i16, Int2, $op)
			}
			(ColumnData::Int4(_), ColumnData::Int4(_)) => {
				eval_same_type!($name, lhs, rhs, $row_count, i32, Int4, $op)
			}
			(ColumnData::Int8(_), ColumnData::Int8(_)) => {
				eval_same_type!($name, lhs, rhs, $row_count, i64, Int8, $op)
			}
			(ColumnData::Uint4(_), ColumnData::Uint4(_)) => {
				eval_same_type!($name, lhs, rhs, $row_count, u32, Uint4, $op)
			}
			(ColumnData::Float8(_), ColumnData::Float8(_)) => {
				eval_same_type_float!($name, lhs, rhs, $row_count, $op)
			}
			_ => {
				return Err(FunctionError::Execution {
					name: $name.to_string(),
					message: format!(
						"unsupported argument types: {:?}, {:?}",
						lhs.data_type(),
						rhs.data_type()
					),
				});
			}
		}
	}};
}

macro_rules! eval_same_type {
	($name:expr, $lhs:expr, $rhs:expr, $row_count:expr, $prim:ty, $variant:ident, +) => {{
		let mut out = Vec::with_capacity($row_count);
		for row in 0..$row_count {
			let a = as_prim_::<$prim>($lhs.value_at(row));
			let b = as_prim_::<$prim>($rhs.value_at(row));
			out.push(a.wrapping_add(b));
		}
		Column::full($name, ColumnData::$variant(out))
	}};
	($name:expr, $lhs:expr, $rhs:expr, $row_count:expr, $prim:ty, $variant:ident, *) => {{
		let mut out = Vec::with_capacity($row_count);
		for row in 0..$row_count {
			let a = as_prim_::<$prim>($lhs.value_at(row));
			let b = as_prim_::<$prim>($rhs.value_at(row));
			out.push(a.wrapping_mul(b));
		}
		Column::full($name, ColumnData::$variant(out))
	}};
}

macro_rules! eval_same_type_float {
	($name:expr, $lhs:expr, $rhs:expr, $row_count:expr, +) => {{
		let mut out = Vec::with_capacity($row_count);
		for row in 0..$row_count {
			out.push(as_f64($lhs.value_at(row)) + as_f64($rhs.value_at(row)));
		}
		Column::full($name, ColumnData::float8(out))
	}};
	($name:expr, $lhs:expr, $rhs:expr, $row_count:expr, *) => {{
		let mut out = Vec::with_capacity($row_count);
		for row in 0..$row_count {
			out.push(as_f64($lhs.value_at(row)) * as_f64($rhs.value_at(row)));
		}
		Column::full($name, ColumnData::float8(out))
	}};
}

fn as_f64(v: reifydb_type::Value) -> f64 {
	match v {
		reifydb_type::Value::Float8(f) => f.into(),
		_ => 0.0,
	}
}

trait FromValue {
	fn from_value(v: reifydb_type::Value) -> Self;
}
macro_rules! impl_from_value {
	($t:ty, $variant:ident) => {
		impl FromValue for $t {
			fn from_value(v: reifydb_type::Value) -> Self {
				match v {
					reifydb_type::Value::$variant(x) => x,
					_ => Default::default(),
				}
			}
		}
	};
}
impl_from_value!(i8, Int1);
impl_from_value!(i16, Int2);
impl_from_value!(i32, Int4);
impl_from_value!(i64, Int8);
impl_from_value!(u32, Uint4);

fn as_prim_<T: FromValue>(v: reifydb_type::Value) -> T {
	T::from_value(v)
}

pub struct Add;

pub struct AddBase {
	return_type: Type,
}

impl FunctionBase for AddBase {
	fn name(&self) -> &str {
		"add"
	}

	fn return_type(&self) -> &Type {
		&self.return_type
	}

	fn monotonicity(&self) -> Monotonicity {
		Monotonicity::Monotonic { increasing: true }
	}

	fn executable(&self) -> Arc<dyn ExecutableFunction> {
		Arc::new(Add)
	}
}

impl ExecutableFunction for Add {
	fn invoke(&self, args: &[Column], row_count: usize) -> Result<Column> {
		if args.len() != 2 {
			return Err(FunctionError::Execution {
				name: "add".to_string(),
				message: format!("expected 2 arguments, got {}", args.len()),
			});
		}
		Ok(binary_numeric_op!("add", args, row_count, +))
	}
}

pub struct AddResolver;

impl FunctionOverloadResolver for AddResolver {
	fn name(&self) -> &str {
		"add"
	}

	fn resolve(&self, argument_types: &[Type]) -> Result<Arc<dyn FunctionBase>> {
		match argument_types {
			[a, b] if a == b && a.is_numeric() => Ok(Arc::new(AddBase { return_type: a.clone() })),
			other => Err(FunctionError::NoMatchingOverload { name: "add".to_string(), argument_types: other.to_vec() }),
		}
	}
}

pub struct Multiply;

pub struct MultiplyBase {
	return_type: Type,
}

impl FunctionBase for MultiplyBase {
	fn name(&self) -> &str {
		"multiply"
	}

	fn return_type(&self) -> &Type {
		&self.return_type
	}

	fn executable(&self) -> Arc<dyn ExecutableFunction> {
		Arc::new(Multiply)
	}
}

impl ExecutableFunction for Multiply {
	fn invoke(&self, args: &[Column], row_count: usize) -> Result<Column> {
		if args.len() != 2 {
			return Err(FunctionError::Execution {
				name: "multiply".to_string(),
				message: format!("expected 2 arguments, got {}", args.len()),
			});
		}
		Ok(binary_numeric_op!("multiply", args, row_count, *))
	}
}

pub struct MultiplyResolver;

impl FunctionOverloadResolver for MultiplyResolver {
	fn name(&self) -> &str {
		"multiply"
	}

	fn resolve(&self, argument_types: &[Type]) -> Result<Arc<dyn FunctionBase>> {
		match argument_types {
			[a, b] if a == b && a.is_numeric() => Ok(Arc::new(MultiplyBase { return_type: a.clone() })),
			other => {
				Err(FunctionError::NoMatchingOverload { name: "multiply".to_string(), argument_types: other.to_vec() })
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reifydb_type::Value;

	#[test]
	fn test_add_int4() {
		let base = AddResolver.resolve(&[Type::Int4, Type::Int4]).unwrap();
		let args = vec![Column::full("a", ColumnData::int4(vec![1, 2, 3])), Column::full("b", ColumnData::int4(vec![10, 20, 30]))];
		let result = base.executable().invoke(&args, 3).unwrap();
		assert_eq!(result.value_at(0), Value::Int4(11));
		assert_eq!(result.value_at(2), Value::Int4(33));
	}

	#[test]
	fn test_add_rejects_mismatched_types() {
		let err = AddResolver.resolve(&[Type::Int4, Type::Utf8]).unwrap_err();
		assert!(matches!(err, FunctionError::NoMatchingOverload { .. }));
	}
}
