// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::dag::ActionsDAG;
use crate::error::{Error, Result};
use crate::node::{NodeId, NodeKind};
use reifydb_column::{Block, Column, ColumnData};
use reifydb_type::{Type, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;

/// One child reference inside an `Action`: the slot it currently lives in,
/// and whether some later step (or the final output) still needs it.
#[derive(Clone, Copy, Debug)]
pub struct Argument {
	pub pos: usize,
	pub needed_later: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
	Alias,
	ArrayJoin,
	Function,
}

/// One step of the linearized plan: an ALIAS, ARRAY_JOIN or FUNCTION node,
/// its resolved argument slots, and the slot its result is written to.
#[derive(Clone, Debug)]
pub struct Action {
	pub kind: ActionKind,
	pub node_id: NodeId,
	pub arguments: Vec<Argument>,
	pub result_position: usize,
}

/// A materialization step in the linearized plan -- either binding a raw
/// INPUT/COLUMN node into its slot, or running an `Action`. Steps are kept
/// in a single topological sequence (rather than "fill all leaves, then run
/// all actions") so slot reuse between a leaf and a later leaf or action
/// never clobbers a value a not-yet-run step still needs.
#[derive(Clone, Debug)]
enum Step {
	Input { node_id: NodeId, slot: usize },
	Column { node_id: NodeId, slot: usize },
	Action(Action),
}

/// A linearized, topologically ordered execution plan derived from an
/// `ActionsDAG`: given an input block, evaluates every step in order and
/// materializes the requested output columns while bounding the number of
/// simultaneously live intermediate columns (spec.md §2, §4.3).
///
/// Immutable after construction and safely shareable by read across
/// threads (spec.md §5) -- `dag` is reference-counted rather than owned so
/// `clone()` is cheap and shares no mutable state.
#[derive(Clone)]
pub struct ExpressionActions {
	dag: Arc<ActionsDAG>,
	steps: Vec<Step>,
	required_columns: Vec<(String, Type)>,
	result_positions: Vec<(String, usize)>,
	num_columns: usize,
	sample_block: Block,
}

impl ExpressionActions {
	/// Linearize `dag` into an executable plan (spec.md §4.3 steps 1-5).
	#[instrument(name = "engine::expression_actions::new", level = "debug", skip(dag))]
	pub fn new(dag: ActionsDAG) -> Result<Self> {
		let dag = Arc::new(dag);
		// INPUT/COLUMN nodes have no dependencies, so it is always valid to
		// run them before every Action -- and necessary here, since a block
		// carries all of its source columns from the start (an ARRAY_JOIN
		// replicates every live column, including ones a later Action
		// hasn't touched yet).
		let topo_order = dag.topological_order();
		let (leaves, actions_order): (Vec<NodeId>, Vec<NodeId>) =
			topo_order.iter().copied().partition(|&id| matches!(dag.node(id).kind, NodeKind::Input | NodeKind::Column));
		let order: Vec<NodeId> = leaves.into_iter().chain(actions_order).collect();
		let in_final_index: HashSet<NodeId> = dag.index().entries().iter().map(|(_, id)| *id).collect();

		let mut last_consumer_pos: HashMap<NodeId, usize> = HashMap::new();
		for (pos, &id) in order.iter().enumerate() {
			for &child in &dag.node(id).children {
				last_consumer_pos.insert(child, pos);
			}
		}

		let mut slot_map: HashMap<NodeId, usize> = HashMap::new();
		let mut free_list: Vec<usize> = Vec::new();
		let mut next_slot = 0usize;
		let mut num_columns = 0usize;
		let mut steps = Vec::with_capacity(order.len());

		for (pos, &id) in order.iter().enumerate() {
			let node = dag.node(id);
			match node.kind {
				NodeKind::Input => {
					let slot = alloc_slot(&mut free_list, &mut next_slot, &mut num_columns);
					slot_map.insert(id, slot);
					steps.push(Step::Input { node_id: id, slot });
				}
				NodeKind::Column => {
					let slot = alloc_slot(&mut free_list, &mut next_slot, &mut num_columns);
					slot_map.insert(id, slot);
					steps.push(Step::Column { node_id: id, slot });
				}
				NodeKind::Alias | NodeKind::ArrayJoin | NodeKind::Function => {
					let kind = match node.kind {
						NodeKind::Alias => ActionKind::Alias,
						NodeKind::ArrayJoin => ActionKind::ArrayJoin,
						NodeKind::Function => ActionKind::Function,
						_ => unreachable!(),
					};
					let mut arguments = Vec::with_capacity(node.children.len());
					for &child in &node.children {
						let child_pos = slot_map[&child];
						// Raw INPUT/COLUMN slots are never recycled -- a
						// block's source columns stay live for the whole
						// execution (see the reordering note above), so
						// only computed-result slots participate in reuse.
						let is_leaf = matches!(dag.node(child).kind, NodeKind::Input | NodeKind::Column);
						let is_last_use = last_consumer_pos.get(&child) == Some(&pos);
						let needed_later = is_leaf || !is_last_use || in_final_index.contains(&child);
						arguments.push(Argument { pos: child_pos, needed_later });
					}
					let result_position = alloc_slot(&mut free_list, &mut next_slot, &mut num_columns);
					slot_map.insert(id, result_position);
					for argument in &arguments {
						if !argument.needed_later {
							free_list.push(argument.pos);
						}
					}
					steps.push(Step::Action(Action { kind, node_id: id, arguments, result_position }));
				}
			}
		}

		let required_columns = dag.required_columns();
		let result_positions: Vec<(String, usize)> =
			dag.index().entries().iter().map(|(name, id)| (name.clone(), slot_map[id])).collect();

		let actions_for_sample = ExpressionActions {
			dag: dag.clone(),
			steps: steps.clone(),
			required_columns: required_columns.clone(),
			result_positions: result_positions.clone(),
			num_columns,
			sample_block: Block::empty(),
		};
		let sample_input = sample_block_input(&required_columns);
		let sample_block = actions_for_sample.execute_internal(&sample_input, 0, true)?;

		Ok(ExpressionActions { dag, steps, required_columns, result_positions, num_columns, sample_block })
	}

	pub fn required_columns(&self) -> &[(String, Type)] {
		&self.required_columns
	}

	pub fn sample_block(&self) -> &Block {
		&self.sample_block
	}

	pub fn num_columns(&self) -> usize {
		self.num_columns
	}

	/// Derive `num_rows` from `block` and execute. An all-constant block
	/// synthesizes the `_dummy` row-count marker (GLOSSARY, spec.md §9).
	pub fn execute_auto(&self, block: &Block, dry_run: bool) -> Result<Block> {
		let num_rows = block.row_count();
		self.execute(block, num_rows, dry_run)
	}

	#[instrument(name = "engine::expression_actions::execute", level = "trace", skip(self, block))]
	pub fn execute(&self, block: &Block, num_rows: usize, dry_run: bool) -> Result<Block> {
		self.execute_internal(block, num_rows, dry_run)
	}

	fn execute_internal(&self, block: &Block, num_rows: usize, dry_run: bool) -> Result<Block> {
		for (name, ty) in &self.required_columns {
			let column = block.column(name).ok_or_else(|| Error::UnknownIdentifier(name.clone()))?;
			if &column.data_type() != ty {
				return Err(Error::TypeMismatch(format!(
					"column {name} expected type {ty}, found {}",
					column.data_type()
				)));
			}
		}

		// project_input (spec.md §3/§9): drop columns the DAG's INPUT
		// nodes never reference before running the plan, rather than
		// carrying them through unused.
		let projected;
		let block = if self.dag.settings().project_input {
			let mut narrowed = block.clone();
			let names: Vec<String> = self.required_columns.iter().map(|(name, _)| name.clone()).collect();
			narrowed.retain_names(&names);
			projected = narrowed;
			&projected
		} else {
			block
		};

		let mut working: Vec<Option<Column>> = vec![None; self.num_columns];
		let mut current_row_count = num_rows;

		for step in &self.steps {
			match step {
				Step::Input { node_id, slot } => {
					let name = &self.dag.node(*node_id).result_name;
					let column = block.column(name).ok_or_else(|| Error::UnknownIdentifier(name.clone()))?;
					working[*slot] = Some(column.clone());
				}
				Step::Column { node_id, slot } => {
					working[*slot] = self.dag.node(*node_id).column.clone();
				}
				Step::Action(action) => {
					self.run_action(action, &mut working, &mut current_row_count, dry_run)?;
					// Checked at the peak, before stale arguments are
					// freed below -- this is the point where the most
					// columns are simultaneously live.
					self.check_limits(&working)?;
					for argument in &action.arguments {
						if !argument.needed_later {
							working[argument.pos] = None;
						}
					}
				}
			}
		}

		let mut out = Block::empty();
		for (name, slot) in &self.result_positions {
			let mut column = working[*slot]
				.clone()
				.ok_or_else(|| Error::LogicalError(format!("result column {name} missing from working set")))?;
			column.name = name.clone();
			out.push(column);
		}
		out.ensure_nonempty(current_row_count);
		Ok(out)
	}

	fn run_action(&self, action: &Action, working: &mut [Option<Column>], current_row_count: &mut usize, dry_run: bool) -> Result<()> {
		let node = self.dag.node(action.node_id);
		match action.kind {
			ActionKind::Alias => {
				let arg = action.arguments[0];
				let mut column = working[arg.pos]
					.clone()
					.ok_or_else(|| Error::LogicalError(format!("alias {} missing source column", node.result_name)))?;
				column.name = node.result_name.clone();
				working[action.result_position] = Some(column);
			}
			ActionKind::ArrayJoin => {
				let arg = action.arguments[0];
				let source = working[arg.pos]
					.as_ref()
					.ok_or_else(|| Error::LogicalError(format!("array join {} missing source column", node.result_name)))?;

				let mut indices = Vec::new();
				let mut flat_values = Vec::new();
				for row in 0..*current_row_count {
					match source.value_at(row) {
						Value::Array(_, values) => {
							indices.extend(std::iter::repeat(row).take(values.len()));
							flat_values.extend(values);
						}
						_ => return Err(Error::ArrayJoinTypeMismatch(node.result_name.clone())),
					}
				}

				for slot in working.iter_mut() {
					if let Some(column) = slot {
						*column = column.take(&indices);
					}
				}

				let result_data = ColumnData::from_values(&node.result_type, flat_values);
				working[action.result_position] = Some(Column::full(node.result_name.clone(), result_data));
				*current_row_count = indices.len();
			}
			ActionKind::Function => {
				if dry_run {
					working[action.result_position] =
						Some(Column::full(node.result_name.clone(), empty_column_for_type(&node.result_type)));
				} else {
					let args: Vec<Column> = action
						.arguments
						.iter()
						.map(|a| {
							working[a.pos].clone().ok_or_else(|| {
								Error::LogicalError(format!("function {} missing argument column", node.result_name))
							})
						})
						.collect::<Result<_>>()?;
					let executable = node.executable.as_ref().ok_or_else(|| {
						Error::LogicalError(format!("function node {} has no bound executable", node.result_name))
					})?;
					let mut result = executable
						.invoke(&args, *current_row_count)
						.map_err(|e| Error::TypeMismatch(format!("function {} failed: {e}", node.result_name)))?;
					result.name = node.result_name.clone();
					working[action.result_position] = Some(result);
				}
			}
		}
		Ok(())
	}

	fn check_limits(&self, working: &[Option<Column>]) -> Result<()> {
		let settings = self.dag.settings();
		let current = working.iter().filter(|c| c.is_some()).count();
		if current > settings.max_temporary_columns {
			return Err(Error::TooManyTemporaryColumns { current, limit: settings.max_temporary_columns });
		}
		let non_const = working.iter().filter_map(|c| c.as_ref()).filter(|c| !c.is_const).count();
		if non_const > settings.max_temporary_non_const_columns {
			return Err(Error::TooManyTemporaryNonConstColumns { current: non_const, limit: settings.max_temporary_non_const_columns });
		}
		Ok(())
	}

	/// `true` iff `name` resolves to a constant whose value is
	/// logically false -- used by the optimizer to short-circuit WHERE
	/// (spec.md §4.3).
	pub fn check_column_is_always_false(&self, name: &str) -> bool {
		let Some(id) = self.dag.index().get(name) else {
			return false;
		};
		let node = self.dag.node(id);
		node.kind == NodeKind::Column && node.column.as_ref().is_some_and(|c| c.is_const && c.value_at(0).is_logically_false())
	}

	/// One line per Action: kind, node name, argument positions, result
	/// position (spec.md §6).
	pub fn dump_actions(&self) -> String {
		let mut out = String::new();
		for step in &self.steps {
			let Step::Action(action) = step else { continue };
			let node = self.dag.node(action.node_id);
			let args: Vec<String> = action.arguments.iter().map(|a| a.pos.to_string()).collect();
			out.push_str(&format!(
				"{kind:?} {name} args=[{args}] -> {result}\n",
				kind = action.kind,
				name = node.result_name,
				args = args.join(", "),
				result = action.result_position
			));
		}
		out
	}
}

fn alloc_slot(free_list: &mut Vec<usize>, next_slot: &mut usize, num_columns: &mut usize) -> usize {
	if let Some(slot) = free_list.pop() {
		slot
	} else {
		let slot = *next_slot;
		*next_slot += 1;
		*num_columns = (*num_columns).max(*next_slot);
		slot
	}
}

fn sample_block_input(required_columns: &[(String, Type)]) -> Block {
	let mut block = Block::empty();
	for (name, ty) in required_columns {
		block.push(Column::full(name.clone(), empty_column_for_type(ty)));
	}
	block
}

fn empty_column_for_type(ty: &Type) -> ColumnData {
	match ty {
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
		Type::Array(element) => ColumnData::array((**element).clone(), Vec::new()),
		Type::Undefined => ColumnData::undefined(0),
	}
}

impl std::fmt::Debug for ActionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ActionKind::Alias => "ALIAS",
			ActionKind::ArrayJoin => "ARRAY_JOIN",
			ActionKind::Function => "FUNCTION",
		};
		f.write_str(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::ActionsSettings;
	use reifydb_function::{FunctionRegistry, FunctionRegistryBuilder};

	fn registry() -> FunctionRegistry {
		FunctionRegistryBuilder::new().with_builtins().build()
	}

	#[test]
	fn test_pure_projection() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		let registry = registry();
		dag.add_function(&registry, "add", &["a", "b"], "s").unwrap();
		dag.project(&[("s".to_string(), "s".to_string())]).unwrap();

		let actions = ExpressionActions::new(dag).unwrap();
		let block = Block::new(vec![Column::full("a", ColumnData::int4(vec![1, 2, 3])), Column::full("b", ColumnData::int4(vec![10, 20, 30]))]);
		let result = actions.execute_auto(&block, false).unwrap();
		let s = result.column("s").unwrap();
		assert_eq!(s.value_at(0), Value::Int4(11));
		assert_eq!(s.value_at(1), Value::Int4(22));
		assert_eq!(s.value_at(2), Value::Int4(33));
	}

	#[test]
	fn test_limit_trip() {
		let mut dag = ActionsDAG::new(ActionsSettings::builder().max_temporary_columns(2).build());
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		dag.add_input("c", Type::Int4).unwrap();
		let registry = registry();
		dag.add_function(&registry, "add", &["a", "b"], "ab").unwrap();
		dag.add_function(&registry, "add", &["ab", "c"], "r").unwrap();
		dag.project(&[("r".to_string(), "r".to_string())]).unwrap();

		let actions = ExpressionActions::new(dag).unwrap();
		let block = Block::new(vec![
			Column::full("a", ColumnData::int4(vec![1])),
			Column::full("b", ColumnData::int4(vec![2])),
			Column::full("c", ColumnData::int4(vec![3])),
		]);
		let err = actions.execute_auto(&block, false).unwrap_err();
		assert!(matches!(err, Error::TooManyTemporaryColumns { .. }));
	}

	#[test]
	fn test_limit_succeeds_with_higher_bound() {
		let mut dag = ActionsDAG::new(ActionsSettings::builder().max_temporary_columns(8).build());
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		dag.add_input("c", Type::Int4).unwrap();
		let registry = registry();
		dag.add_function(&registry, "add", &["a", "b"], "ab").unwrap();
		dag.add_function(&registry, "add", &["ab", "c"], "r").unwrap();
		dag.project(&[("r".to_string(), "r".to_string())]).unwrap();

		let actions = ExpressionActions::new(dag).unwrap();
		let block = Block::new(vec![
			Column::full("a", ColumnData::int4(vec![1])),
			Column::full("b", ColumnData::int4(vec![2])),
			Column::full("c", ColumnData::int4(vec![3])),
		]);
		let result = actions.execute_auto(&block, false).unwrap();
		assert_eq!(result.column("r").unwrap().value_at(0), Value::Int4(6));
	}

	#[test]
	fn test_check_column_is_always_false() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_column("k", Column::constant("k", Value::Boolean(false)));
		dag.project(&[("k".to_string(), "k".to_string())]).unwrap();
		let actions = ExpressionActions::new(dag).unwrap();
		assert!(actions.check_column_is_always_false("k"));
	}

	#[test]
	fn test_sample_block_reports_schema_without_data() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		let registry = registry();
		dag.add_function(&registry, "add", &["a", "b"], "s").unwrap();
		dag.project(&[("s".to_string(), "s".to_string())]).unwrap();

		let actions = ExpressionActions::new(dag).unwrap();
		assert_eq!(actions.sample_block().schema(), vec![("s".to_string(), Type::Int4)]);
	}

	#[test]
	fn test_array_join_expands_rows() {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("arr", Type::Array(Box::new(Type::Int4))).unwrap();
		dag.add_input("k", Type::Int4).unwrap();
		dag.add_array_join("arr", "e").unwrap();
		dag.project(&[("e".to_string(), "e".to_string()), ("k".to_string(), "k".to_string())]).unwrap();

		let actions = ExpressionActions::new(dag).unwrap();
		let block = Block::new(vec![
			Column::full("arr", ColumnData::array(Type::Int4, vec![vec![Value::Int4(1), Value::Int4(2)], vec![Value::Int4(3)]])),
			Column::full("k", ColumnData::int4(vec![10, 20])),
		]);
		let result = actions.execute_auto(&block, false).unwrap();
		let e = result.column("e").unwrap();
		let k = result.column("k").unwrap();
		assert_eq!(e.data.len(), 3);
		assert_eq!(e.value_at(0), Value::Int4(1));
		assert_eq!(e.value_at(1), Value::Int4(2));
		assert_eq!(e.value_at(2), Value::Int4(3));
		assert_eq!(k.value_at(1), Value::Int4(10));
		assert_eq!(k.value_at(2), Value::Int4(20));
	}
}
