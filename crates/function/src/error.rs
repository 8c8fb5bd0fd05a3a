// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use reifydb_type::Type;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FunctionError {
	#[error("unknown function: {0}")]
	UnknownFunction(String),

	#[error("function {name} has no overload for argument types {argument_types:?}")]
	NoMatchingOverload { name: String, argument_types: Vec<Type> },

	#[error("function {name} failed: {message}")]
	Execution { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, FunctionError>;
