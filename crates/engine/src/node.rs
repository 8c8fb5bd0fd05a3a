// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use reifydb_column::Column;
use reifydb_function::{ExecutableFunction, FunctionBase};
use reifydb_type::Type;
use std::sync::Arc;

/// Index into an `ActionsDAG`'s node arena. Identity is by position, never
/// by name -- two nodes may share a `result_name`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	Input,
	Column,
	Alias,
	ArrayJoin,
	Function,
}

/// One vertex of an `ActionsDAG`: the computation of exactly one named,
/// typed column. Field population depends on `kind` -- see spec.md §3's
/// per-kind arity table.
#[derive(Clone)]
pub struct Node {
	pub kind: NodeKind,
	pub result_name: String,
	pub result_type: Type,
	pub children: Vec<NodeId>,
	pub function_base: Option<Arc<dyn FunctionBase>>,
	pub executable: Option<Arc<dyn ExecutableFunction>>,
	pub is_compiled: bool,
	pub column: Option<Column>,
	pub allow_constant_folding: bool,
}

impl Node {
	pub fn input(name: impl Into<String>, result_type: Type) -> Self {
		Node {
			kind: NodeKind::Input,
			result_name: name.into(),
			result_type,
			children: Vec::new(),
			function_base: None,
			executable: None,
			is_compiled: false,
			column: None,
			allow_constant_folding: true,
		}
	}

	pub fn column(name: impl Into<String>, column: Column, allow_constant_folding: bool) -> Self {
		let result_type = column.data_type();
		Node {
			kind: NodeKind::Column,
			result_name: name.into(),
			result_type,
			children: Vec::new(),
			function_base: None,
			executable: None,
			is_compiled: false,
			column: Some(column),
			allow_constant_folding,
		}
	}

	pub fn alias(name: impl Into<String>, result_type: Type, child: NodeId) -> Self {
		Node {
			kind: NodeKind::Alias,
			result_name: name.into(),
			result_type,
			children: vec![child],
			function_base: None,
			executable: None,
			is_compiled: false,
			column: None,
			allow_constant_folding: true,
		}
	}

	pub fn array_join(name: impl Into<String>, result_type: Type, child: NodeId) -> Self {
		Node {
			kind: NodeKind::ArrayJoin,
			result_name: name.into(),
			result_type,
			children: vec![child],
			function_base: None,
			executable: None,
			is_compiled: false,
			column: None,
			allow_constant_folding: true,
		}
	}

	pub fn function(
		name: impl Into<String>,
		children: Vec<NodeId>,
		function_base: Arc<dyn FunctionBase>,
		executable: Arc<dyn ExecutableFunction>,
	) -> Self {
		let result_type = function_base.return_type().clone();
		Node {
			kind: NodeKind::Function,
			result_name: name.into(),
			result_type,
			children,
			function_base: Some(function_base),
			executable: Some(executable),
			is_compiled: false,
			column: None,
			allow_constant_folding: true,
		}
	}

	/// A `COLUMN` node is a *true constant* if it carries a broadcast
	/// value rather than a materialized per-row source column -- the
	/// distinction the constant-folding rule in spec.md §4.1 keys on.
	pub fn is_true_constant(&self) -> bool {
		self.kind == NodeKind::Column && self.column.as_ref().is_some_and(|c| c.is_const)
	}
}
