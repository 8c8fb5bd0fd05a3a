// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::node::NodeId;
use std::collections::HashMap;

/// The DAG's output interface: an ordered sequence of `(name, NodeId)`
/// entries plus a `name -> last position` map for by-name lookup.
///
/// The sequence may hold duplicate names (spec.md §3, §9 -- e.g.
/// `project([alias_of_x, alias_of_x_with_different_type])`); the map always
/// resolves to the most recently inserted occurrence. This is a from-
/// scratch reimplementation, not a port: the source's `remove` has a
/// visible bug (it bails out when the name *is* present, the opposite of
/// what it should do); this version actually removes the entry.
#[derive(Clone, Debug, Default)]
pub struct Index {
	entries: Vec<(String, NodeId)>,
	by_name: HashMap<String, usize>,
}

impl Index {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> &[(String, NodeId)] {
		&self.entries
	}

	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<NodeId> {
		self.by_name.get(name).map(|&pos| self.entries[pos].1)
	}

	/// Append a new entry; it becomes the name's resolvable occurrence.
	pub fn push(&mut self, name: impl Into<String>, id: NodeId) {
		let name = name.into();
		self.by_name.insert(name.clone(), self.entries.len());
		self.entries.push((name, id));
	}

	/// Replace the last entry with `name` in place (preserving its
	/// position), or append if absent. Used by `addAlias(.., can_replace
	/// = true)` and `project()`.
	pub fn replace(&mut self, name: impl Into<String>, id: NodeId) {
		let name = name.into();
		if let Some(&pos) = self.by_name.get(&name) {
			self.entries[pos].1 = id;
		} else {
			self.push(name, id);
		}
	}

	/// Remove the last entry named `name`, if any. The underlying node
	/// is untouched; it simply stops being part of the output interface
	/// (spec.md §3: "the underlying node remains in the graph").
	pub fn remove(&mut self, name: &str) -> bool {
		let Some(pos) = self.entries.iter().rposition(|(n, _)| n == name) else {
			return false;
		};
		self.entries.remove(pos);
		self.rebuild_map();
		true
	}

	/// Rebuild `self` keeping only entries for which `keep` returns
	/// `Some(new_id)`, remapping ids in the process. Used by
	/// `removeUnusedActions` and `splitActionsBeforeArrayJoin` after
	/// the node arena itself has been compacted.
	pub fn filter_map(&self, mut keep: impl FnMut(&str, NodeId) -> Option<NodeId>) -> Index {
		let mut out = Index::new();
		for (name, id) in &self.entries {
			if let Some(new_id) = keep(name, *id) {
				out.push(name.clone(), new_id);
			}
		}
		out
	}

	fn rebuild_map(&mut self) {
		self.by_name.clear();
		for (pos, (name, _)) in self.entries.iter().enumerate() {
			self.by_name.insert(name.clone(), pos);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(n: u32) -> NodeId {
		NodeId(n)
	}

	#[test]
	fn test_duplicate_names_keep_last_resolvable() {
		let mut index = Index::new();
		index.push("y", id(1));
		index.push("y", id(2));
		assert_eq!(index.get("y"), Some(id(2)));
		assert_eq!(index.len(), 2);
	}

	#[test]
	fn test_remove_drops_last_occurrence_only() {
		let mut index = Index::new();
		index.push("y", id(1));
		index.push("y", id(2));
		assert!(index.remove("y"));
		assert_eq!(index.get("y"), Some(id(1)));
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn test_remove_missing_name_returns_false() {
		let mut index = Index::new();
		index.push("x", id(1));
		assert!(!index.remove("nope"));
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn test_replace_keeps_position() {
		let mut index = Index::new();
		index.push("a", id(1));
		index.push("b", id(2));
		index.replace("a", id(3));
		assert_eq!(index.entries()[0], ("a".to_string(), id(3)));
		assert_eq!(index.len(), 2);
	}
}
