// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::array_join::{ArrayJoinAction, IJoin, TableJoin};
use crate::dag::ActionsDAG;
use crate::error::{Error, Result};
use crate::expression_actions::ExpressionActions;
use crate::settings::ActionsSettings;
use reifydb_column::Column;
use reifydb_type::Type;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// One output column of a step, as seen by the step that follows it
/// (spec.md §4.4's `addStep`). Constant columns are carried forward as
/// constants -- with their original `allow_constant_folding` flag -- so a
/// later step can keep folding on them; everything else becomes a plain
/// INPUT of the next step's DAG.
struct OutputColumn {
	name: String,
	ty: Type,
	constant: Option<(Column, bool)>,
}

/// Wraps an `ActionsDAG`. `finalize` narrows it to what downstream still
/// needs; `prepend_project_input` flips on input projection (spec.md §4.4).
pub struct ExpressionActionsStep {
	pub actions: ActionsDAG,
}

impl ExpressionActionsStep {
	pub fn new(actions: ActionsDAG) -> Self {
		Self { actions }
	}

	pub fn required_columns(&self) -> Vec<String> {
		self.actions.required_columns().into_iter().map(|(name, _)| name).collect()
	}

	pub fn result_columns(&self) -> Vec<String> {
		self.actions.index().entries().iter().map(|(name, _)| name.clone()).collect()
	}

	fn output_columns(&self) -> Vec<OutputColumn> {
		self.actions
			.index()
			.entries()
			.iter()
			.map(|(name, id)| {
				let node = self.actions.node(*id);
				let constant = if node.is_true_constant() {
					node.column.clone().map(|column| (column, node.allow_constant_folding))
				} else {
					None
				};
				OutputColumn { name: name.clone(), ty: node.result_type.clone(), constant }
			})
			.collect()
	}

	/// `removeUnusedActions(out)`, unless `projected_output` already
	/// pinned this step's output (spec.md §4.4).
	pub fn finalize(&mut self, required_output: &[&str]) -> Result<()> {
		if !self.actions.settings().projected_output {
			self.actions.remove_unused_actions(required_output)?;
		}
		Ok(())
	}

	pub fn prepend_project_input(&mut self) {
		self.actions.settings_mut().project_input = true;
	}

	pub fn dump(&self) -> String {
		self.actions.dump_dag()
	}

	/// Builds the runnable `ExpressionActions` for this step's current
	/// DAG state. Cheap-ish but not free (linearizes and runs a sample
	/// block), so callers should call it once per finalized step.
	pub fn build_expression_actions(&self) -> Result<ExpressionActions> {
		ExpressionActions::new(self.actions.clone())
	}
}

/// Carries a fixed `ArrayJoinAction` plus the required/result column lists
/// the chain needs for finalization bookkeeping -- the action itself has no
/// notion of types, so the caller supplies the result schema up front.
pub struct ArrayJoinStep {
	pub action: ArrayJoinAction,
	required_columns: Vec<String>,
	result_schema: Vec<(String, Type)>,
}

impl ArrayJoinStep {
	pub fn new(action: ArrayJoinAction, required_columns: Vec<String>, result_schema: Vec<(String, Type)>) -> Self {
		Self { action, required_columns, result_schema }
	}

	pub fn required_columns(&self) -> &[String] {
		&self.required_columns
	}

	pub fn result_columns(&self) -> Vec<String> {
		self.result_schema.iter().map(|(name, _)| name.clone()).collect()
	}

	fn output_columns(&self) -> Vec<OutputColumn> {
		self.result_schema.iter().map(|(name, ty)| OutputColumn { name: name.clone(), ty: ty.clone(), constant: None }).collect()
	}

	/// Narrows the result set to names still in `required_output`.
	pub fn finalize(&mut self, required_output: &[&str]) -> Result<()> {
		let keep: HashSet<&str> = required_output.iter().copied().collect();
		self.result_schema.retain(|(name, _)| keep.contains(name.as_str()));
		Ok(())
	}

	pub fn dump(&self) -> String {
		format!(
			"ARRAY_JOIN columns=[{}] emit_keys={} -> [{}]\n",
			self.action.required_columns().join(", "),
			self.action.emit_keys,
			self.result_columns().join(", ")
		)
	}
}

/// Carries a `TableJoin` analyzer and an `IJoin` runtime, plus the
/// required/result column lists (spec.md §4.4, §6).
pub struct JoinStep {
	pub join: Arc<dyn TableJoin>,
	pub runtime: Arc<dyn IJoin>,
	required_columns: Vec<String>,
	result_schema: Vec<(String, Type)>,
}

impl JoinStep {
	pub fn new(
		join: Arc<dyn TableJoin>,
		runtime: Arc<dyn IJoin>,
		required_columns: Vec<String>,
		result_schema: Vec<(String, Type)>,
	) -> Self {
		Self { join, runtime, required_columns, result_schema }
	}

	pub fn required_columns(&self) -> &[String] {
		&self.required_columns
	}

	pub fn result_columns(&self) -> Vec<String> {
		self.result_schema.iter().map(|(name, _)| name.clone()).collect()
	}

	fn output_columns(&self) -> Vec<OutputColumn> {
		self.result_schema.iter().map(|(name, ty)| OutputColumn { name: name.clone(), ty: ty.clone(), constant: None }).collect()
	}

	pub fn finalize(&mut self, required_output: &[&str]) -> Result<()> {
		let keep: HashSet<&str> = required_output.iter().copied().collect();
		self.result_schema.retain(|(name, _)| keep.contains(name.as_str()));
		Ok(())
	}

	pub fn dump(&self) -> String {
		format!("JOIN required=[{}] -> [{}]\n", self.required_columns.join(", "), self.result_columns().join(", "))
	}
}

/// One stage of an `ActionsChain`. The set of variants is closed and grows
/// slowly -- a tagged enum dispatching to per-variant logic, not a class
/// hierarchy (spec.md REDESIGN FLAGS).
pub enum Step {
	Expression(ExpressionActionsStep),
	ArrayJoin(ArrayJoinStep),
	Join(JoinStep),
}

impl Step {
	pub fn required_columns(&self) -> Vec<String> {
		match self {
			Step::Expression(step) => step.required_columns(),
			Step::ArrayJoin(step) => step.required_columns().to_vec(),
			Step::Join(step) => step.required_columns().to_vec(),
		}
	}

	pub fn result_columns(&self) -> Vec<String> {
		match self {
			Step::Expression(step) => step.result_columns(),
			Step::ArrayJoin(step) => step.result_columns(),
			Step::Join(step) => step.result_columns(),
		}
	}

	fn output_columns(&self) -> Vec<OutputColumn> {
		match self {
			Step::Expression(step) => step.output_columns(),
			Step::ArrayJoin(step) => step.output_columns(),
			Step::Join(step) => step.output_columns(),
		}
	}

	pub fn finalize(&mut self, required_output: &[&str]) -> Result<()> {
		match self {
			Step::Expression(step) => step.finalize(required_output),
			Step::ArrayJoin(step) => step.finalize(required_output),
			Step::Join(step) => step.finalize(required_output),
		}
	}

	pub fn dump(&self) -> String {
		match self {
			Step::Expression(step) => step.dump(),
			Step::ArrayJoin(step) => step.dump(),
			Step::Join(step) => step.dump(),
		}
	}

	pub fn as_expression(&self) -> Option<&ExpressionActionsStep> {
		match self {
			Step::Expression(step) => Some(step),
			_ => None,
		}
	}

	pub fn as_expression_mut(&mut self) -> Option<&mut ExpressionActionsStep> {
		match self {
			Step::Expression(step) => Some(step),
			_ => None,
		}
	}
}

/// An ordered sequence of `Step`s composing multiple stages of expression
/// evaluation, array-join and join into one plan (spec.md §4.4).
#[derive(Default)]
pub struct ActionsChain {
	steps: Vec<Step>,
}

impl ActionsChain {
	pub fn new() -> Self {
		Self { steps: Vec::new() }
	}

	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	pub fn len(&self) -> usize {
		self.steps.len()
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	pub fn push(&mut self, step: Step) {
		self.steps.push(step);
	}

	/// Pushes a new `ExpressionActionsStep` whose starting Index is the
	/// previous step's result columns. Names listed in
	/// `non_constant_inputs` are added as plain INPUTs even if the
	/// previous step produced them as constants, so later constant
	/// folding does not assume a stale constancy (spec.md §4.4).
	#[instrument(name = "engine::actions_chain::add_step", level = "debug", skip(self))]
	pub fn add_step(&mut self, non_constant_inputs: &[&str]) -> Result<()> {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		if let Some(previous) = self.steps.last() {
			for column in previous.output_columns() {
				let forced_non_constant = non_constant_inputs.contains(&column.name.as_str());
				match column.constant {
					Some((value, allow_folding)) if !forced_non_constant => {
						dag.add_column_with_folding(column.name, value, allow_folding);
					}
					_ => {
						dag.add_input(column.name, column.ty)?;
					}
				}
			}
		}
		self.steps.push(Step::Expression(ExpressionActionsStep::new(dag)));
		Ok(())
	}

	pub fn get_last_actions(&self) -> Result<&ExpressionActionsStep> {
		match self.steps.last() {
			Some(step) => step.as_expression().ok_or_else(|| Error::LogicalError("last chain step is not an ExpressionActionsStep".to_string())),
			None => Err(Error::EmptyChain),
		}
	}

	pub fn get_last_actions_mut(&mut self) -> Result<&mut ExpressionActionsStep> {
		match self.steps.last_mut() {
			Some(step) => step.as_expression_mut().ok_or_else(|| Error::LogicalError("last chain step is not an ExpressionActionsStep".to_string())),
			None => Err(Error::EmptyChain),
		}
	}

	pub fn get_last_step(&self) -> Result<&Step> {
		self.steps.last().ok_or(Error::EmptyChain)
	}

	pub fn clear(&mut self) {
		self.steps.clear();
	}

	/// Walks the chain back-to-front, propagating required-output
	/// demand upstream. For the last step, `required_output` is
	/// `final_required_output`. For each earlier step it is the union
	/// of the next step's (already-finalized) `required_columns()` and
	/// whatever of the running demand that next step does not itself
	/// produce (spec.md §4.4).
	#[instrument(name = "engine::actions_chain::finalize", level = "debug", skip(self))]
	pub fn finalize(&mut self, final_required_output: &[&str]) -> Result<()> {
		if self.steps.is_empty() {
			return Err(Error::EmptyChain);
		}

		let mut required_output: Vec<String> = final_required_output.iter().map(|name| name.to_string()).collect();
		for i in (0..self.steps.len()).rev() {
			let demand: Vec<&str> = required_output.iter().map(|name| name.as_str()).collect();
			self.steps[i].finalize(&demand)?;

			if i > 0 {
				let produced_here: HashSet<String> = self.steps[i].result_columns().into_iter().collect();
				let mut upstream_demand: Vec<String> =
					required_output.into_iter().filter(|name| !produced_here.contains(name)).collect();
				for name in self.steps[i].required_columns() {
					if !upstream_demand.contains(&name) {
						upstream_demand.push(name);
					}
				}
				required_output = upstream_demand;
			}
		}
		Ok(())
	}

	pub fn dump_chain(&self) -> String {
		let mut out = String::new();
		for (i, step) in self.steps.iter().enumerate() {
			out.push_str(&format!("-- step {i} --\n"));
			out.push_str(&step.dump());
		}
		out
	}
}
