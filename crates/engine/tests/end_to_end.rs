// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

//! End-to-end scenarios exercising the full `ActionsDAG` ->
//! `ExpressionActions` -> `ActionsChain` pipeline through the crate's
//! public API only.

use reifydb_column::{Block, Column, ColumnData};
use reifydb_engine::{ActionsDAG, ActionsSettings, Error, ExpressionActions, NodeKind};
use reifydb_function::FunctionRegistryBuilder;
use reifydb_type::{Type, Value};

fn registry() -> reifydb_function::FunctionRegistry {
	FunctionRegistryBuilder::new().with_builtins().build()
}

#[test]
fn scenario_1_pure_projection() {
	let mut dag = ActionsDAG::new(ActionsSettings::default());
	dag.add_input("a", Type::Int4).unwrap();
	dag.add_input("b", Type::Int4).unwrap();
	let registry = registry();
	dag.add_function(&registry, "add", &["a", "b"], "s").unwrap();
	dag.project(&[("s".to_string(), "s".to_string())]).unwrap();

	let actions = ExpressionActions::new(dag).unwrap();
	let block = Block::new(vec![
		Column::full("a", ColumnData::int4(vec![1, 2, 3])),
		Column::full("b", ColumnData::int4(vec![10, 20, 30])),
	]);
	let result = actions.execute_auto(&block, false).unwrap();

	assert_eq!(result.columns().len(), 1);
	let s = result.column("s").unwrap();
	assert_eq!(s.value_at(0), Value::Int4(11));
	assert_eq!(s.value_at(1), Value::Int4(22));
	assert_eq!(s.value_at(2), Value::Int4(33));
}

#[test]
fn scenario_2_alias_shadowing() {
	let mut dag = ActionsDAG::new(ActionsSettings::default());
	dag.add_input("x", Type::Int4).unwrap();
	dag.add_alias("x", "y").unwrap();
	let first_y = dag.index().get("y").unwrap();
	dag.add_alias_can_replace("x", "y", true).unwrap();
	let second_y = dag.index().get("y").unwrap();
	assert_ne!(first_y, second_y);

	let before = dag.dump_dag().lines().count();
	dag.remove_unused_actions(&["y"]).unwrap();
	let after = dag.dump_dag().lines().count();
	assert!(after < before, "the shadowed first alias should have become unreachable");

	// Executing still resolves "y" to the surviving (second) alias.
	let actions = ExpressionActions::new(dag).unwrap();
	let block = Block::new(vec![Column::full("x", ColumnData::int4(vec![7]))]);
	let result = actions.execute_auto(&block, false).unwrap();
	assert_eq!(result.column("y").unwrap().value_at(0), Value::Int4(7));
}

#[test]
fn scenario_3_constant_fold() {
	let mut dag = ActionsDAG::new(ActionsSettings::default());
	dag.add_column("c1", Column::constant("c1", Value::Int4(2)));
	dag.add_column("c2", Column::constant("c2", Value::Int4(3)));
	let registry = registry();
	let k = dag.add_function(&registry, "add", &["c1", "c2"], "k").unwrap();

	let node = dag.node(k);
	assert_eq!(node.kind, NodeKind::Column);
	assert_eq!(node.column.as_ref().unwrap().value_at(0), Value::Int4(5));
	assert!(!dag.dump_dag().contains("FUNCTION"));
}

#[test]
fn scenario_4_ignore_blocks_folding() {
	let mut dag = ActionsDAG::new(ActionsSettings::default());
	dag.add_column("c", Column::constant("c", Value::Int4(1)));
	let registry = registry();
	let z = dag.add_function(&registry, "ignore", &["c"], "z").unwrap();

	let z_node = dag.node(z);
	assert_eq!(z_node.kind, NodeKind::Column);
	assert!(!z_node.allow_constant_folding);

	dag.add_column("z2", Column::constant("z2", Value::Uint1(9)));
	let w = dag.add_function(&registry, "add", &["z", "z2"], "w").unwrap();
	assert_eq!(dag.node(w).kind, NodeKind::Function);
}

#[test]
fn scenario_5_array_join_split_soundness() {
	let registry = registry();

	let build_dag = || {
		let mut dag = ActionsDAG::new(ActionsSettings::default());
		dag.add_input("arr", Type::Array(Box::new(Type::Int4))).unwrap();
		dag.add_input("k", Type::Int4).unwrap();
		dag.add_column("two", Column::constant("two", Value::Int4(2)));
		dag.add_function(&registry, "multiply", &["k", "two"], "k2").unwrap();
		dag.add_array_join("arr", "e").unwrap();
		dag.add_function(&registry, "add", &["e", "k2"], "r").unwrap();
		dag
	};

	let source_block = || {
		Block::new(vec![
			Column::full(
				"arr",
				ColumnData::array(
					Type::Int4,
					vec![
						vec![Value::Int4(1), Value::Int4(2)],
						vec![Value::Int4(3)],
					],
				),
			),
			Column::full("k", ColumnData::int4(vec![10, 20])),
		])
	};

	// Reference: execute the whole, unsplit DAG directly.
	let whole = ExpressionActions::new(build_dag()).unwrap();
	let expected = whole.execute_auto(&source_block(), false).unwrap();
	let expected_r = expected.column("r").unwrap();

	// Split, run pre, manually perform the array join (the external
	// collaborator's job -- ArrayJoinAction/IJoin are interfaces only,
	// spec.md §1), then run post, and check the results agree.
	let mut dag = build_dag();
	let pre = dag.split_actions_before_array_join(&["arr"]).expect("should split");
	assert!(pre.index().get("k2").is_some());
	assert!(pre.index().get("arr").is_some());
	assert_eq!(dag.node(dag.index().get("e").unwrap()).kind, NodeKind::Input);

	let pre_actions = ExpressionActions::new(pre).unwrap();
	let pre_block = pre_actions.execute_auto(&source_block(), false).unwrap();

	let arr_column = pre_block.column("arr").unwrap();
	let mut indices = Vec::new();
	let mut flat = Vec::new();
	for row in 0..pre_block.row_count() {
		match arr_column.value_at(row) {
			Value::Array(_, values) => {
				for value in values {
					indices.push(row);
					flat.push(value);
				}
			}
			other => panic!("expected array value, got {other:?}"),
		}
	}
	let mut joined = Vec::new();
	for column in pre_block.columns() {
		if column.name == "arr" {
			joined.push(Column::full("e", ColumnData::from_values(&Type::Int4, flat.clone())));
		} else {
			joined.push(column.take(&indices));
		}
	}
	let joined_block = Block::new(joined);

	let post_actions = ExpressionActions::new(dag).unwrap();
	let post_result = post_actions.execute_auto(&joined_block, false).unwrap();
	let actual_r = post_result.column("r").unwrap();

	assert_eq!(actual_r.row_count(post_result.row_count()), expected_r.row_count(expected.row_count()));
	for row in 0..post_result.row_count() {
		assert_eq!(actual_r.value_at(row), expected_r.value_at(row));
	}
}

#[test]
fn scenario_6_limit_trip() {
	let registry = registry();
	let build_dag = |max_temporary_columns: usize| {
		let settings = ActionsSettings::builder().max_temporary_columns(max_temporary_columns).build();
		let mut dag = ActionsDAG::new(settings);
		dag.add_input("a", Type::Int4).unwrap();
		dag.add_input("b", Type::Int4).unwrap();
		dag.add_input("c", Type::Int4).unwrap();
		dag.add_function(&registry, "add", &["a", "b"], "ab").unwrap();
		dag.add_function(&registry, "add", &["ab", "c"], "abc").unwrap();
		dag.project(&[("abc".to_string(), "abc".to_string())]).unwrap();
		dag
	};
	let block = Block::new(vec![
		Column::full("a", ColumnData::int4(vec![1])),
		Column::full("b", ColumnData::int4(vec![2])),
		Column::full("c", ColumnData::int4(vec![3])),
	]);

	let tight = ExpressionActions::new(build_dag(2)).unwrap();
	let err = tight.execute_auto(&block, false).unwrap_err();
	assert!(matches!(err, Error::TooManyTemporaryColumns { .. }));

	let roomy = ExpressionActions::new(build_dag(8)).unwrap();
	let ok = roomy.execute_auto(&block, false).unwrap();
	assert_eq!(ok.column("abc").unwrap().value_at(0), Value::Int4(6));
}
