// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::{FunctionError, Result};
use crate::executable::ExecutableFunction;
use crate::resolver::{FunctionBase, FunctionOverloadResolver};
use reifydb_column::{Column, ColumnData};
use reifydb_type::{Type, Value};
use std::sync::Arc;

pub struct Not;

pub struct NotBase;

impl FunctionBase for NotBase {
	fn name(&self) -> &str {
		"not"
	}

	fn return_type(&self) -> &Type {
		&Type::Boolean
	}

	fn executable(&self) -> Arc<dyn ExecutableFunction> {
		Arc::new(Not)
	}
}

impl ExecutableFunction for Not {
	fn invoke(&self, args: &[Column], row_count: usize) -> Result<Column> {
		let [arg] = args else {
			return Err(FunctionError::Execution {
				name: "not".to_string(),
				message: format!("expected 1 argument, got {}", args.len()),
			});
		};
		let mut out = Vec::with_capacity(row_count);
		for row in 0..row_count {
			out.push(match arg.value_at(row) {
				Value::Boolean(b) => !b,
				_ => {
					return Err(FunctionError::Execution {
						name: "not".to_string(),
						message: "argument is not boolean".to_string(),
					});
				}
			});
		}
		Ok(Column::full("not", ColumnData::bool(out)))
	}
}

pub struct NotResolver;

impl FunctionOverloadResolver for NotResolver {
	fn name(&self) -> &str {
		"not"
	}

	fn resolve(&self, argument_types: &[Type]) -> Result<Arc<dyn FunctionBase>> {
		match argument_types {
			[Type::Boolean] => Ok(Arc::new(NotBase)),
			other => Err(FunctionError::NoMatchingOverload { name: "not".to_string(), argument_types: other.to_vec() }),
		}
	}
}
