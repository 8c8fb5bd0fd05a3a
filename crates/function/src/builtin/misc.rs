// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::{FunctionError, Result};
use crate::executable::ExecutableFunction;
use crate::resolver::{FunctionBase, FunctionOverloadResolver};
use reifydb_column::{Column, ColumnData};
use reifydb_type::Type;
use std::sync::Arc;

/// `ignore(x)` always returns `0`, regardless of `x`. Used to exercise the
/// `allow_constant_folding() == false` path: the result is constant, but
/// the FUNCTION node that computes it must not be replaced by a COLUMN
/// node carrying the folded value (spec.md §3, §4.1).
pub struct Ignore;

pub struct IgnoreBase;

impl FunctionBase for IgnoreBase {
	fn name(&self) -> &str {
		"ignore"
	}

	fn return_type(&self) -> &Type {
		&Type::Uint1
	}

	fn allow_constant_folding(&self) -> bool {
		false
	}

	fn executable(&self) -> Arc<dyn ExecutableFunction> {
		Arc::new(Ignore)
	}
}

impl ExecutableFunction for Ignore {
	fn invoke(&self, _args: &[Column], row_count: usize) -> Result<Column> {
		Ok(Column::full("ignore", ColumnData::uint1(vec![0u8; row_count])))
	}
}

pub struct IgnoreResolver;

impl FunctionOverloadResolver for IgnoreResolver {
	fn name(&self) -> &str {
		"ignore"
	}

	fn resolve(&self, argument_types: &[Type]) -> Result<Arc<dyn FunctionBase>> {
		if argument_types.len() != 1 {
			return Err(FunctionError::NoMatchingOverload {
				name: "ignore".to_string(),
				argument_types: argument_types.to_vec(),
			});
		}
		Ok(Arc::new(IgnoreBase))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reifydb_type::Value;

	#[test]
	fn test_ignore_is_not_constant_foldable() {
		let base = IgnoreResolver.resolve(&[Type::Int4]).unwrap();
		assert!(!base.allow_constant_folding());
		let args = vec![Column::full("x", ColumnData::int4(vec![5, 6, 7]))];
		let result = base.executable().invoke(&args, 3).unwrap();
		assert_eq!(result.value_at(0), Value::Uint1(0));
		assert_eq!(result.value_at(2), Value::Uint1(0));
	}
}
