// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("unknown identifier: {0}")]
	UnknownIdentifier(String),

	#[error("type mismatch: {0}")]
	TypeMismatch(String),

	#[error("duplicate input: {0}")]
	DuplicateInput(String),

	#[error("chain is empty")]
	EmptyChain,

	#[error("too many temporary columns: {current} > {limit}")]
	TooManyTemporaryColumns { current: usize, limit: usize },

	#[error("too many temporary non-const columns: {current} > {limit}")]
	TooManyTemporaryNonConstColumns { current: usize, limit: usize },

	#[error("array join type mismatch: column {0} is not an array")]
	ArrayJoinTypeMismatch(String),

	#[error("logical error: {0}")]
	LogicalError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
