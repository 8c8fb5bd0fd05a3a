// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::compiler::ExpressionCompiler;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::node::{Node, NodeId, NodeKind};
use crate::settings::ActionsSettings;
use reifydb_column::Column;
use reifydb_function::FunctionRegistry;
use reifydb_type::Type;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// A directed acyclic graph of typed, named column-producing nodes: the
/// intermediate representation for expression computations (spec.md §1).
/// Owns every `Node` in a stable arena; `Index` is a separate, name-indexed
/// view over the currently visible subset.
#[derive(Clone)]
pub struct ActionsDAG {
	nodes: Vec<Node>,
	index: Index,
	settings: ActionsSettings,
}

impl ActionsDAG {
	pub fn new(settings: ActionsSettings) -> Self {
		Self { nodes: Vec::new(), index: Index::new(), settings }
	}

	pub fn settings(&self) -> &ActionsSettings {
		&self.settings
	}

	pub fn settings_mut(&mut self) -> &mut ActionsSettings {
		&mut self.settings
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.index()]
	}

	pub fn index(&self) -> &Index {
		&self.index
	}

	pub(crate) fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	fn push_node(&mut self, node: Node) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(node);
		id
	}

	/// Insert an INPUT node. Errors `DuplicateInput` if another INPUT
	/// already uses `name` (spec.md §3: "result_name must be unique
	/// within inputs"). Inputs start out visible: the DAG's initial
	/// output interface is its own input schema, the way a freshly
	/// built `ActionsDAG` always can.
	#[instrument(name = "engine::actions_dag::add_input", level = "trace", skip(self, name))]
	pub fn add_input(&mut self, name: impl Into<String>, result_type: Type) -> Result<NodeId> {
		let name = name.into();
		if self.nodes.iter().any(|n| n.kind == NodeKind::Input && n.result_name == name) {
			return Err(Error::DuplicateInput(name));
		}
		let id = self.push_node(Node::input(name.clone(), result_type));
		self.index.push(name, id);
		Ok(id)
	}

	/// Insert a COLUMN node holding `column`, a true constant or a
	/// materialized source column (spec.md §4.1).
	pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> NodeId {
		self.add_column_with_folding(name, column, true)
	}

	/// As `add_column`, but marks the resulting constant as one that
	/// must never be consumed by downstream folding (spec.md §3, §9 --
	/// the `ignore()` case).
	pub fn add_column_with_folding(&mut self, name: impl Into<String>, column: Column, allow_constant_folding: bool) -> NodeId {
		let name = name.into();
		let id = self.push_node(Node::column(name.clone(), column, allow_constant_folding));
		self.index.push(name, id);
		id
	}

	#[instrument(name = "engine::actions_dag::add_alias", level = "trace", skip(self, alias))]
	pub fn add_alias(&mut self, source_name: &str, alias: impl Into<String>) -> Result<NodeId> {
		self.add_alias_inner(source_name, alias, false)
	}

	pub fn add_alias_can_replace(&mut self, source_name: &str, alias: impl Into<String>, can_replace: bool) -> Result<NodeId> {
		self.add_alias_inner(source_name, alias, can_replace)
	}

	fn add_alias_inner(&mut self, source_name: &str, alias: impl Into<String>, can_replace: bool) -> Result<NodeId> {
		let alias = alias.into();
		let source_id = self.index.get(source_name).ok_or_else(|| Error::UnknownIdentifier(source_name.to_string()))?;
		let result_type = self.nodes[source_id.index()].result_type.clone();
		let id = self.push_node(Node::alias(alias.clone(), result_type, source_id));
		if can_replace && self.index.contains(&alias) {
			self.index.replace(alias, id);
		} else {
			self.index.push(alias, id);
		}
		Ok(id)
	}

	/// Bulk rename without pruning: every `(source_name, alias)` pair is
	/// added via `add_alias`.
	pub fn add_aliases(&mut self, list: &[(String, String)]) -> Result<()> {
		for (source_name, alias) in list {
			self.add_alias(source_name, alias.clone())?;
		}
		Ok(())
	}

	/// Bulk alias **and** replace the Index so only the listed columns,
	/// in that order, remain visible. Sets `projected_output`.
	#[instrument(name = "engine::actions_dag::project", level = "debug", skip(self, list))]
	pub fn project(&mut self, list: &[(String, String)]) -> Result<()> {
		let mut new_index = Index::new();
		for (source_name, output_name) in list {
			let id = self.index.get(source_name).ok_or_else(|| Error::UnknownIdentifier(source_name.clone()))?;
			if source_name == output_name {
				new_index.push(output_name.clone(), id);
			} else {
				let result_type = self.nodes[id.index()].result_type.clone();
				let alias_id = self.push_node(Node::alias(output_name.clone(), result_type, id));
				new_index.push(output_name.clone(), alias_id);
			}
		}
		self.index = new_index;
		self.settings.projected_output = true;
		Ok(())
	}

	#[instrument(name = "engine::actions_dag::add_array_join", level = "trace", skip(self, result_name))]
	pub fn add_array_join(&mut self, source_name: &str, result_name: impl Into<String>) -> Result<NodeId> {
		let result_name = result_name.into();
		let source_id = self.index.get(source_name).ok_or_else(|| Error::UnknownIdentifier(source_name.to_string()))?;
		let source_type = self.nodes[source_id.index()].result_type.clone();
		let element_type = source_type
			.array_element()
			.cloned()
			.ok_or_else(|| Error::TypeMismatch(format!("{source_name} is not an array column")))?;
		let id = self.push_node(Node::array_join(result_name.clone(), element_type, source_id));
		self.index.push(result_name, id);
		Ok(id)
	}

	/// Resolve `name` against `registry`, bind it to the children named
	/// by `argument_names`, and insert either a FUNCTION node or --
	/// when every argument is a true, foldable constant and the
	/// function is deterministic -- a folded COLUMN node in its place
	/// (spec.md §4.1's constant-folding rule).
	#[instrument(name = "engine::actions_dag::add_function", level = "trace", skip(self, registry))]
	pub fn add_function(
		&mut self,
		registry: &FunctionRegistry,
		name: &str,
		argument_names: &[&str],
		result_name: &str,
	) -> Result<NodeId> {
		let mut children = Vec::with_capacity(argument_names.len());
		let mut argument_types = Vec::with_capacity(argument_names.len());
		for arg_name in argument_names {
			let id = self.index.get(arg_name).ok_or_else(|| Error::UnknownIdentifier((*arg_name).to_string()))?;
			argument_types.push(self.nodes[id.index()].result_type.clone());
			children.push(id);
		}

		let function_base = registry.resolve(name, &argument_types).map_err(|e| Error::TypeMismatch(e.to_string()))?;
		let executable = function_base.executable();

		let all_foldable = function_base.is_deterministic()
			&& children.iter().all(|&id| {
				let node = &self.nodes[id.index()];
				node.is_true_constant() && node.allow_constant_folding
			});

		if all_foldable {
			let args: Vec<Column> =
				children.iter().map(|&id| self.nodes[id.index()].column.clone().expect("checked true constant")).collect();
			let folded = executable.invoke(&args, 1).map_err(|e| Error::TypeMismatch(e.to_string()))?;
			let allow_fold = function_base.allow_constant_folding();
			tracing::debug!(function = name, result = result_name, allow_fold, "constant-folded function call");
			let id = self.push_node(Node::column(result_name, folded, allow_fold));
			self.index.push(result_name, id);
			return Ok(id);
		}

		let id = self.push_node(Node::function(result_name, children, function_base, executable));
		self.index.push(result_name, id);
		Ok(id)
	}

	/// Remove the last Index entry named `name`. The node itself stays
	/// in the arena and may still be reachable transitively.
	pub fn remove_column(&mut self, name: &str) -> bool {
		self.index.remove(name)
	}

	/// Re-expose a node that is still in the arena but not currently in
	/// the Index. Returns whether such a node was found.
	pub fn try_restore_column(&mut self, name: &str) -> bool {
		if let Some((pos, _)) = self.nodes.iter().enumerate().rev().find(|(_, n)| n.result_name == name) {
			self.index.push(name.to_string(), NodeId(pos as u32));
			true
		} else {
			false
		}
	}

	/// Nodes reachable from the current Index -- the "required" set of
	/// spec.md §3's I4.
	pub(crate) fn reachable_from_index(&self) -> HashSet<NodeId> {
		let ids: Vec<NodeId> = self.index.entries().iter().map(|(_, id)| *id).collect();
		self.collect_reachable(&ids)
	}

	/// A topological order (children before parents) over the nodes
	/// reachable from the Index. Used by `ExpressionActions::new` to
	/// linearize the DAG (spec.md §4.3 step 1).
	pub(crate) fn topological_order(&self) -> Vec<NodeId> {
		let reachable = self.reachable_from_index();
		let mut order = Vec::with_capacity(reachable.len());
		let mut visited = HashSet::new();
		let ids: Vec<NodeId> = self.index.entries().iter().map(|(_, id)| *id).collect();
		for id in ids {
			self.visit_topo(id, &reachable, &mut visited, &mut order);
		}
		order
	}

	fn visit_topo(&self, id: NodeId, reachable: &HashSet<NodeId>, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
		if !reachable.contains(&id) || !visited.insert(id) {
			return;
		}
		for &child in &self.nodes[id.index()].children {
			self.visit_topo(child, reachable, visited, order);
		}
		order.push(id);
	}

	fn collect_reachable(&self, start: &[NodeId]) -> HashSet<NodeId> {
		let mut seen = HashSet::new();
		let mut stack: Vec<NodeId> = start.to_vec();
		while let Some(id) = stack.pop() {
			if seen.insert(id) {
				stack.extend(self.nodes[id.index()].children.iter().copied());
			}
		}
		seen
	}

	/// Compute the set of nodes reachable from the names in `required`
	/// (equivalently, from whichever of those names are currently in
	/// the Index), and delete everything else from both arena and
	/// Index. Idempotent: calling it twice with the same `required`
	/// leaves the DAG unchanged the second time (spec.md §8).
	#[instrument(name = "engine::actions_dag::remove_unused_actions", level = "debug", skip(self))]
	pub fn remove_unused_actions(&mut self, required: &[&str]) -> Result<()> {
		// Resolve each required name through `Index::get` -- the
		// currently *resolvable* occurrence -- rather than keeping
		// every entry that happens to share the name. Otherwise a
		// shadowed alias (spec.md §8 scenario 2) would never become
		// unreachable, since its stale entry still matches the name.
		let resolved: Vec<(&str, Option<NodeId>)> = required.iter().map(|&name| (name, self.index.get(name))).collect();
		let start_ids: Vec<NodeId> = resolved.iter().filter_map(|&(_, id)| id).collect();
		let keep = self.collect_reachable(&start_ids);

		let mut old_to_new = HashMap::new();
		let mut new_nodes = Vec::with_capacity(keep.len());
		for (old_idx, node) in self.nodes.iter().enumerate() {
			let old_id = NodeId(old_idx as u32);
			if keep.contains(&old_id) {
				old_to_new.insert(old_id, NodeId(new_nodes.len() as u32));
				new_nodes.push(node.clone());
			}
		}
		for node in &mut new_nodes {
			for child in &mut node.children {
				*child = old_to_new[child];
			}
		}

		let mut new_index = Index::new();
		for (name, old_id) in resolved {
			if let Some(new_id) = old_id.and_then(|id| old_to_new.get(&id).copied()) {
				new_index.push(name.to_string(), new_id);
			}
		}

		tracing::debug!(removed = self.nodes.len() - new_nodes.len(), "pruned unused actions");
		self.nodes = new_nodes;
		self.index = new_index;
		Ok(())
	}

	/// Split off a new DAG containing every node that does *not*
	/// transitively depend on an ARRAY_JOIN of one of
	/// `array_joined_columns`, leaving the dependent remainder in
	/// `self` -- with the boundary ARRAY_JOIN nodes converted to INPUT
	/// nodes of the same name and type, since by the time `self`
	/// executes the join will already have happened externally
	/// (spec.md §4.2). Returns `None` if nothing could be pulled out.
	///
	/// Non-deterministic functions are pinned to the post (dependent)
	/// side regardless of their actual argument dependencies, standing
	/// in for spec.md §9's "functions marked row-sensitive stay on the
	/// post-array-join side" (this implementation has no separate
	/// row-sensitivity flag; non-determinism is the closest available
	/// proxy and is documented as such in DESIGN.md).
	#[instrument(name = "engine::actions_dag::split_actions_before_array_join", level = "debug", skip(self))]
	pub fn split_actions_before_array_join(&mut self, array_joined_columns: &[&str]) -> Option<ActionsDAG> {
		let source_ids: Vec<NodeId> = array_joined_columns.iter().filter_map(|name| self.index.get(name)).collect();
		if source_ids.is_empty() {
			return None;
		}

		let required_ids: Vec<NodeId> = self.index.entries().iter().map(|(_, id)| *id).collect();
		let reachable = self.collect_reachable(&required_ids);

		let mut memo: HashMap<NodeId, bool> = HashMap::new();
		for &id in &reachable {
			self.is_dependent_on_array_join(id, &source_ids, &mut memo);
		}

		let mut pre_ids: Vec<NodeId> =
			reachable.iter().copied().filter(|id| !source_ids.contains(id) && !memo[id]).collect();
		if pre_ids.is_empty() {
			return None;
		}
		for &id in &source_ids {
			if !pre_ids.contains(&id) {
				pre_ids.push(id);
			}
		}
		let post_ids: Vec<NodeId> = reachable.iter().copied().filter(|id| memo[id]).collect();

		pre_ids.sort_by_key(|id| id.index());
		let mut pre_map = HashMap::new();
		let mut pre_nodes = Vec::with_capacity(pre_ids.len());
		for &old_id in &pre_ids {
			pre_map.insert(old_id, NodeId(pre_nodes.len() as u32));
			pre_nodes.push(self.nodes[old_id.index()].clone());
		}
		for node in &mut pre_nodes {
			for child in &mut node.children {
				*child = pre_map[child];
			}
		}
		let mut pre_index = self.index.filter_map(|name, id| pre_map.get(&id).copied());
		for &old_id in &source_ids {
			let name = self.nodes[old_id.index()].result_name.clone();
			if pre_index.get(&name).is_none() {
				pre_index.push(name, pre_map[&old_id]);
			}
		}

		let mut post_ids = post_ids;
		post_ids.sort_by_key(|id| id.index());
		let mut post_map = HashMap::new();
		let mut post_nodes = Vec::with_capacity(post_ids.len());
		for &old_id in &post_ids {
			post_map.insert(old_id, NodeId(post_nodes.len() as u32));
			let mut node = self.nodes[old_id.index()].clone();
			if node.kind == NodeKind::ArrayJoin && node.children.first().is_some_and(|c| source_ids.contains(c)) {
				node.kind = NodeKind::Input;
				node.children.clear();
			}
			post_nodes.push(node);
		}
		// A post-side node may reference a child that stayed on the pre
		// side (e.g. `k2` above, feeding the post-side `+`): that value
		// will arrive as an ordinary block column once the external
		// join has run, so give it an INPUT node here too -- same name
		// and type, deduplicated across consumers.
		let mut boundary_inputs: HashMap<NodeId, NodeId> = HashMap::new();
		for i in 0..post_nodes.len() {
			let children = post_nodes[i].children.clone();
			let mut remapped = Vec::with_capacity(children.len());
			for old_child in children {
				let new_id = if let Some(&id) = post_map.get(&old_child) {
					id
				} else if let Some(&id) = boundary_inputs.get(&old_child) {
					id
				} else {
					let source = &self.nodes[old_child.index()];
					let input_node = Node::input(source.result_name.clone(), source.result_type.clone());
					let id = NodeId(post_nodes.len() as u32);
					post_nodes.push(input_node);
					boundary_inputs.insert(old_child, id);
					id
				};
				remapped.push(new_id);
			}
			post_nodes[i].children = remapped;
		}
		let post_index = self.index.filter_map(|name, id| post_map.get(&id).copied());

		self.nodes = post_nodes;
		self.index = post_index;

		Some(ActionsDAG { nodes: pre_nodes, index: pre_index, settings: self.settings.clone() })
	}

	fn is_dependent_on_array_join(&self, id: NodeId, source_ids: &[NodeId], memo: &mut HashMap<NodeId, bool>) -> bool {
		if let Some(&v) = memo.get(&id) {
			return v;
		}
		memo.insert(id, false);
		let node = &self.nodes[id.index()];
		let boundary = node.kind == NodeKind::ArrayJoin && node.children.first().is_some_and(|c| source_ids.contains(c));
		let non_deterministic = node.kind == NodeKind::Function && node.function_base.as_ref().is_some_and(|f| !f.is_deterministic());
		let inherited = node.children.iter().any(|&c| self.is_dependent_on_array_join(c, source_ids, memo));
		let result = boundary || non_deterministic || inherited;
		memo.insert(id, result);
		result
	}

	/// Fuse maximal eligible FUNCTION subgraphs via `compiler`, when
	/// `compile_expressions` is enabled (spec.md §4.2, §9). With the
	/// default `NoopCompiler` this never changes observable results.
	/// This is deliberately the simple single-node variant rather than
	/// full maximal-subgraph fusion -- see DESIGN.md.
	#[instrument(name = "engine::actions_dag::compile_expressions", level = "debug", skip(self, compiler))]
	pub fn compile_expressions(&mut self, compiler: &dyn ExpressionCompiler) {
		if !self.settings.compile_expressions {
			return;
		}
		let required_ids: Vec<NodeId> = self.index.entries().iter().map(|(_, id)| *id).collect();
		let reachable: Vec<NodeId> = self.collect_reachable(&required_ids).into_iter().collect();

		for id in reachable {
			let node = &self.nodes[id.index()];
			if node.kind != NodeKind::Function || node.is_compiled {
				continue;
			}
			let Some(base) = node.function_base.clone() else { continue };
			if !base.is_deterministic() {
				continue;
			}
			let size = self.function_subtree_size(id);
			if size < self.settings.min_count_to_compile_expression {
				continue;
			}
			let argument_types: Vec<Type> = node.children.iter().map(|&c| self.nodes[c.index()].result_type.clone()).collect();
			let return_type = node.result_type.clone();
			if let Some(compiled) = compiler.compile(&argument_types, &return_type) {
				let result_name = node.result_name.clone();
				let node = &mut self.nodes[id.index()];
				node.executable = Some(compiled);
				node.is_compiled = true;
				tracing::debug!(node = result_name, size, "fused function subgraph into compiled node");
			}
		}
	}

	fn function_subtree_size(&self, id: NodeId) -> usize {
		let node = &self.nodes[id.index()];
		if node.kind != NodeKind::Function {
			return 0;
		}
		1 + node.children.iter().map(|&c| self.function_subtree_size(c)).sum::<usize>()
	}

	pub fn has_array_join(&self) -> bool {
		self.nodes.iter().any(|n| n.kind == NodeKind::ArrayJoin)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.iter().all(|n| n.kind == NodeKind::Input)
	}

	/// INPUT nodes reachable from the Index, in discovery order.
	pub fn required_columns(&self) -> Vec<(String, Type)> {
		let mut seen = HashSet::new();
		let mut out = Vec::new();
		let ids: Vec<NodeId> = self.index.entries().iter().map(|(_, id)| *id).collect();
		for id in ids {
			self.collect_inputs(id, &mut seen, &mut out);
		}
		out
	}

	fn collect_inputs(&self, id: NodeId, seen: &mut HashSet<NodeId>, out: &mut Vec<(String, Type)>) {
		if !seen.insert(id) {
			return;
		}
		let node = &self.nodes[id.index()];
		if node.kind == NodeKind::Input {
			out.push((node.result_name.clone(), node.result_type.clone()));
		}
		for &child in &node.children {
			self.collect_inputs(child, seen, out);
		}
	}

	/// One line per node: kind, name, type, argument positions.
	pub fn dump_dag(&self) -> String {
		let mut out = String::new();
		for (pos, node) in self.nodes.iter().enumerate() {
			let children: Vec<String> = node.children.iter().map(|c| c.index().to_string()).collect();
			out.push_str(&format!(
				"{pos}: {kind:?} {name} : {ty} <- [{children}]\n",
				kind = node.kind,
				name = node.result_name,
				ty = node.result_type,
				children = children.join(", ")
			));
		}
		out
	}

	/// The Index's visible output names, in order.
	pub fn dump_names(&self) -> String {
		self.index.entries().iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>().join(", ")
	}
}

impl std::fmt::Debug for NodeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			NodeKind::Input => "INPUT",
			NodeKind::Column => "COLUMN",
			NodeKind::Alias => "ALIAS",
			NodeKind::ArrayJoin => "ARRAY_JOIN",
			NodeKind::Function => "FUNCTION",
		};
		f.write_str(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reifydb_column::Column;
	use reifydb_function::FunctionRegistryBuilder;
	use reifydb_type::Value;

	fn registry() -> FunctionRegistry {
		FunctionRegistryBuilder::new().with_builtins().build()
	}

	#[test]
	fn test_add_input_rejects_duplicate_name() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("a", Type::Int4).unwrap();
		let err = dag.add_input("a", Type::Int4).unwrap_err();
		assert_eq!(err, Error::DuplicateInput("a".to_string()));
	}

	#[test]
	fn test_constant_fold_replaces_function_with_column() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_column("c1", Column::constant("c1", Value::Int4(2)));
		dag.add_column("c2", Column::constant("c2", Value::Int4(3)));
		let registry = registry();
		let id = dag.add_function(&registry, "add", &["c1", "c2"], "k").unwrap();
		let node = dag.node(id);
		assert_eq!(node.kind, NodeKind::Column);
		assert_eq!(node.column.as_ref().unwrap().value_at(0), Value::Int4(5));
	}

	#[test]
	fn test_ignore_folds_but_blocks_further_folding() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_column("c", Column::constant("c", Value::Int4(1)));
		let registry = registry();
		let z = dag.add_function(&registry, "ignore", &["c"], "z").unwrap();
		assert!(!dag.node(z).allow_constant_folding);

		dag.add_column("c2", Column::constant("c2", Value::Uint1(9)));
		let w = dag.add_function(&registry, "add", &["z", "c2"], "w").unwrap();
		assert_eq!(dag.node(w).kind, NodeKind::Function);
	}

	#[test]
	fn test_alias_shadowing_resolves_to_latest() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("x", Type::Int4).unwrap();
		let first = dag.add_alias("x", "y").unwrap();
		let second = dag.add_alias_can_replace("x", "y", true).unwrap();
		assert_eq!(dag.index().get("y"), Some(second));
		assert_ne!(first, second);
	}

	#[test]
	fn test_remove_unused_actions_is_idempotent() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		let registry = registry();
		dag.add_function(&registry, "add", &["a", "b"], "s").unwrap();
		dag.remove_unused_actions(&["s"]).unwrap();
		let n1 = dag.nodes().len();
		dag.remove_unused_actions(&["s"]).unwrap();
		assert_eq!(dag.nodes().len(), n1);
		assert!(dag.index().get("a").is_none());
	}

	#[test]
	fn test_remove_unused_actions_drops_shadowed_alias() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("x", Type::Int4).unwrap();
		dag.add_alias("x", "y").unwrap();
		dag.add_alias_can_replace("x", "y", true).unwrap();
		let before = dag.nodes().len();

		dag.remove_unused_actions(&["y"]).unwrap();

		// Only the resolvable ("x", second "y") nodes survive; the
		// shadowed first alias is gone.
		assert!(dag.nodes().len() < before);
		assert_eq!(dag.index().entries().len(), 1);
	}

	#[test]
	fn test_split_before_array_join_keeps_post_side_executable() {
		// A post-side node ("r") may reference a value computed on
		// the pre side ("k2"); the split must wire that through as a
		// boundary INPUT rather than leaving a dangling child id.
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("arr", Type::Array(Box::new(Type::Int4))).unwrap();
		dag.add_input("k", Type::Int4).unwrap();
		let registry = registry();
		dag.add_column("two", Column::constant("two", Value::Int4(2)));
		dag.add_function(&registry, "multiply", &["k", "two"], "k2").unwrap();
		dag.add_array_join("arr", "e").unwrap();
		dag.add_function(&registry, "add", &["e", "k2"], "r").unwrap();

		dag.split_actions_before_array_join(&["arr"]).expect("should split");

		let r = dag.node(dag.index().get("r").unwrap());
		assert_eq!(r.children.len(), 2);
		for &child in &r.children {
			assert_eq!(dag.node(child).kind, NodeKind::Input);
		}
		assert_eq!(dag.required_columns().len(), 2);
	}

	#[test]
	fn test_split_before_array_join_pulls_out_independent_computation() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("arr", Type::Array(Box::new(Type::Int4))).unwrap();
		dag.add_input("k", Type::Int4).unwrap();
		let registry = registry();
		dag.add_column("two", Column::constant("two", Value::Int4(2)));
		dag.add_function(&registry, "multiply", &["k", "two"], "k2").unwrap();
		dag.add_array_join("arr", "e").unwrap();
		dag.add_function(&registry, "add", &["e", "k2"], "r").unwrap();

		let pre = dag.split_actions_before_array_join(&["arr"]).expect("should split");
		assert!(pre.index().get("k2").is_some());
		assert!(pre.index().get("arr").is_some());
		assert!(dag.index().get("r").is_some());
		assert_eq!(dag.node(dag.index().get("e").unwrap()).kind, NodeKind::Input);
	}

	#[test]
	fn test_split_returns_none_when_nothing_is_independent() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("arr", Type::Array(Box::new(Type::Int4))).unwrap();
		dag.add_array_join("arr", "e").unwrap();
		assert!(dag.split_actions_before_array_join(&["arr"]).is_none());
	}
}
