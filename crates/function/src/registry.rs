// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::{FunctionError, Result};
use crate::resolver::{FunctionBase, FunctionOverloadResolver};
use indexmap::IndexMap;
use reifydb_type::Type;
use std::sync::Arc;

/// Name-indexed catalog of overload resolvers. Not the scalar function
/// catalog itself (out of scope, spec.md §1) -- just the lookup surface
/// `addFunction` dials through.
#[derive(Default)]
pub struct FunctionRegistry {
	resolvers: IndexMap<String, Arc<dyn FunctionOverloadResolver>>,
}

impl FunctionRegistry {
	pub fn new() -> Self {
		Self { resolvers: IndexMap::new() }
	}

	pub fn register(&mut self, resolver: Arc<dyn FunctionOverloadResolver>) {
		self.resolvers.insert(resolver.name().to_string(), resolver);
	}

	pub fn resolve(&self, name: &str, argument_types: &[Type]) -> Result<Arc<dyn FunctionBase>> {
		let resolver = self
			.resolvers
			.get(name)
			.ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
		resolver.resolve(argument_types)
	}
}

/// Builds a `FunctionRegistry` pre-populated with the built-in catalog.
pub struct FunctionRegistryBuilder {
	registry: FunctionRegistry,
}

impl FunctionRegistryBuilder {
	pub fn new() -> Self {
		Self { registry: FunctionRegistry::new() }
	}

	pub fn with(mut self, resolver: Arc<dyn FunctionOverloadResolver>) -> Self {
		self.registry.register(resolver);
		self
	}

	pub fn with_builtins(self) -> Self {
		self.with(Arc::new(crate::builtin::AddResolver))
			.with(Arc::new(crate::builtin::MultiplyResolver))
			.with(Arc::new(crate::builtin::NotResolver))
			.with(Arc::new(crate::builtin::IgnoreResolver))
	}

	pub fn build(self) -> FunctionRegistry {
		self.registry
	}
}

impl Default for FunctionRegistryBuilder {
	fn default() -> Self {
		Self::new()
	}
}
