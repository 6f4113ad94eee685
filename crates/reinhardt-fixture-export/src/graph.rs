//! Type-level dependency graph.
//!
//! Edges point from a referring type to the type it references, so the
//! referenced type has to be replayed first. Besides the edges the graph keeps
//! two registries the traversal consults: per-type relationship exclusions and
//! the many-to-many relationships already emitted from one side.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

/// Ordered edge map: type to the types it depends on.
pub type EdgeMap = IndexMap<String, IndexSet<String>>;

/// Dependency edges plus exclusion and many-to-many bookkeeping.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
	edges: EdgeMap,
	exclusions: IndexMap<String, IndexSet<String>>,
	represented: IndexMap<String, String>,
}

impl DependencyGraph {
	/// Creates an empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Ensures `type_key` has an entry.
	///
	/// `exclusions` is recorded on first registration only; later calls for the
	/// same type ignore it.
	pub fn register_type<I, E>(&mut self, type_key: &str, exclusions: I)
	where
		I: IntoIterator<Item = E>,
		E: Into<String>,
	{
		if !self.edges.contains_key(type_key) {
			self.edges.insert(type_key.to_string(), IndexSet::new());
		}
		if !self.exclusions.contains_key(type_key) {
			let names = exclusions.into_iter().map(Into::into).collect();
			self.exclusions.insert(type_key.to_string(), names);
		}
	}

	/// Records that `from` references `to`.
	pub fn add_edge(&mut self, from: &str, to: &str) {
		self.edges
			.entry(from.to_string())
			.or_default()
			.insert(to.to_string());
	}

	/// Removes one edge. Returns true if it existed.
	pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
		self.edges
			.get_mut(from)
			.map(|targets| targets.shift_remove(to))
			.unwrap_or(false)
	}

	/// Returns true if `type_key` asked to leave `relationship` out.
	pub fn is_relationship_excluded(&self, type_key: &str, relationship: &str) -> bool {
		self.exclusions
			.get(type_key)
			.is_some_and(|names| names.contains(relationship))
	}

	/// Marks a many-to-many relationship as emitted.
	///
	/// `key` is either `Type.relation` or a bare join type name; `counterpart`
	/// is the type on the other end.
	pub fn mark_many_to_many_represented(&mut self, key: &str, counterpart: &str) {
		self.represented
			.entry(key.to_string())
			.or_insert_with(|| counterpart.to_string());
	}

	/// Returns true if `key` was marked.
	///
	/// A bare key (no dot) also matches any marked `key.relation` entry.
	pub fn is_many_to_many_represented(&self, key: &str) -> bool {
		self.lookup_represented(key, None)
	}

	/// Like [`is_many_to_many_represented`](Self::is_many_to_many_represented),
	/// but a bare key only matches `key.relation` entries marked with
	/// `counterpart` as their other end.
	pub fn is_many_to_many_represented_towards(&self, key: &str, counterpart: &str) -> bool {
		self.lookup_represented(key, Some(counterpart))
	}

	fn lookup_represented(&self, key: &str, counterpart: Option<&str>) -> bool {
		if self.represented.contains_key(key) {
			return true;
		}
		if key.contains('.') {
			return false;
		}
		let prefix = format!("{}.", key);
		self.represented.iter().any(|(marked, other)| {
			marked.starts_with(&prefix) && counterpart.is_none_or(|expected| other == expected)
		})
	}

	/// Returns the counterpart type `key` was marked with.
	pub fn many_to_many_counterpart(&self, key: &str) -> Option<&str> {
		self.represented.get(key).map(String::as_str)
	}

	/// Returns the marked many-to-many keys with their counterpart types.
	pub fn represented_many_to_many(&self) -> &IndexMap<String, String> {
		&self.represented
	}

	/// Returns the edge map in registration order.
	pub fn ordered_edges(&self) -> &EdgeMap {
		&self.edges
	}

	/// Returns the types `type_key` depends on.
	pub fn dependencies_of(&self, type_key: &str) -> Option<&IndexSet<String>> {
		self.edges.get(type_key)
	}

	/// Returns true if `type_key` has an entry.
	pub fn contains_type(&self, type_key: &str) -> bool {
		self.edges.contains_key(type_key)
	}

	/// Returns the number of types with an entry.
	pub fn type_count(&self) -> usize {
		self.edges.len()
	}

	/// Returns the total number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.values().map(IndexSet::len).sum()
	}

	/// Finds the edges that close a cycle.
	///
	/// Walks the edge map depth first with an explicit stack and returns every
	/// back edge as `(referrer, referenced)`. Removing all returned edges leaves
	/// the graph acyclic. Self edges are ignored.
	pub fn find_looping_edges(&self) -> Vec<(String, String)> {
		let mut looping = Vec::new();
		let mut visited: HashSet<String> = HashSet::new();
		let mut on_path: HashSet<String> = HashSet::new();

		for start in self.edges.keys() {
			if !visited.insert(start.clone()) {
				continue;
			}
			on_path.insert(start.clone());
			let mut stack: Vec<(String, usize)> = vec![(start.clone(), 0)];

			while let Some(frame) = stack.last_mut() {
				let node = frame.0.clone();
				let next = self
					.edges
					.get(&node)
					.and_then(|targets| targets.get_index(frame.1))
					.cloned();

				match next {
					Some(target) => {
						frame.1 += 1;
						if target == node {
							continue;
						}
						if on_path.contains(&target) {
							looping.push((node, target));
						} else if visited.insert(target.clone()) {
							on_path.insert(target.clone());
							stack.push((target, 0));
						}
					}
					None => {
						on_path.remove(&node);
						stack.pop();
					}
				}
			}
		}

		looping
	}
}
