// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use reifydb_function::ExecutableFunction;
use reifydb_type::Type;
use std::sync::Arc;

/// The external JIT collaborator (spec.md §6, §9). Given a subgraph's
/// argument types, produces a fused `ExecutableFunction` plus a handle the
/// caller may keep in a process-wide compilation cache.
///
/// Absence of a compiler (the `NoopCompiler` below) must never change
/// observable results -- `compileExpressions` is purely a performance
/// optimization.
pub trait ExpressionCompiler: Send + Sync {
	fn compile(&self, argument_types: &[Type], return_type: &Type) -> Option<Arc<dyn ExecutableFunction>>;
}

/// Compiles nothing. The default collaborator when no JIT backend is
/// wired in -- `ActionsDAG::compile_expressions` becomes a no-op.
#[derive(Default)]
pub struct NoopCompiler;

impl ExpressionCompiler for NoopCompiler {
	fn compile(&self, _argument_types: &[Type], _return_type: &Type) -> Option<Arc<dyn ExecutableFunction>> {
		None
	}
}
