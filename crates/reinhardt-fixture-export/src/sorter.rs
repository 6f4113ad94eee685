//! Dependency ordering for output groups.
//!
//! [`KahnSorter`] orders types so that every type comes after the types it
//! references. Cycles do not fail the sort: nodes stuck in a cycle are
//! appended in a stable order and reported through [`CycleDiagnostic`].

use std::collections::VecDeque;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::graph::EdgeMap;

/// A node the sort could not place because of a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDiagnostic {
	/// Node left over after the queue drained.
	pub node: String,
	/// Number of dependents that were never resolved.
	pub remaining: usize,
}

impl fmt::Display for CycleDiagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Node `{}` has `{}` left over dependencies",
			self.node, self.remaining
		)
	}
}

/// Result of a sort: the order plus anything that could not be placed cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOutcome {
	/// Nodes with dependencies first.
	pub order: Vec<String>,
	/// One entry per node caught in a cycle.
	pub diagnostics: Vec<CycleDiagnostic>,
}

impl SortOutcome {
	/// Returns true if every node was placed without a cycle.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Kahn topological sort over a borrowed edge map.
pub struct KahnSorter<'a> {
	edges: &'a EdgeMap,
}

impl<'a> KahnSorter<'a> {
	/// Creates a sorter over `edges` (`node → dependencies`).
	pub fn new(edges: &'a EdgeMap) -> Self {
		Self { edges }
	}

	/// Sorts the nodes.
	///
	/// # Example
	///
	/// ```
	/// # use indexmap::{IndexMap, IndexSet};
	/// # use reinhardt_fixture_export::sorter::KahnSorter;
	/// let mut edges = IndexMap::new();
	/// edges.insert("butter".to_string(), IndexSet::from(["milk".to_string(), "salt".to_string()]));
	/// edges.insert("milk".to_string(), IndexSet::from(["cow".to_string()]));
	///
	/// let outcome = KahnSorter::new(&edges).sort();
	/// assert_eq!(outcome.order, vec!["cow", "salt", "milk", "butter"]);
	/// ```
	pub fn sort(&self) -> SortOutcome {
		// Node order: sources and targets as first seen.
		let mut counters: IndexMap<&str, usize> = IndexMap::new();
		for (node, dependencies) in self.edges {
			counters.entry(node.as_str()).or_insert(0);
			for dependency in dependencies {
				counters.entry(dependency.as_str()).or_insert(0);
			}
		}

		for (node, dependencies) in self.edges {
			debug!(
				"[Dependency resolution] {} depends on [{}]",
				node,
				join(dependencies)
			);
			for dependency in dependencies {
				if dependency == node {
					continue;
				}
				if let Some(counter) = counters.get_mut(dependency.as_str()) {
					*counter += 1;
				}
			}
		}

		let mut queue: VecDeque<&str> = counters
			.iter()
			.filter(|(_, counter)| **counter == 0)
			.map(|(node, _)| *node)
			.collect();

		let mut order: Vec<String> = Vec::with_capacity(counters.len());
		let mut placed: IndexSet<&str> = IndexSet::new();

		while let Some(node) = queue.pop_front() {
			order.push(node.to_string());
			placed.insert(node);

			let Some(dependencies) = self.edges.get(node) else {
				continue;
			};
			for dependency in dependencies {
				if dependency == node {
					continue;
				}
				if let Some(counter) = counters.get_mut(dependency.as_str()) {
					*counter -= 1;
					if *counter == 0 {
						queue.push_back(dependency.as_str());
					}
				}
			}
		}

		let mut diagnostics = Vec::new();
		for (node, remaining) in &counters {
			if placed.contains(node) {
				continue;
			}
			let diagnostic = CycleDiagnostic {
				node: node.to_string(),
				remaining: *remaining,
			};
			debug!("{}", diagnostic);
			order.push(node.to_string());
			diagnostics.push(diagnostic);
		}

		order.reverse();
		SortOutcome { order, diagnostics }
	}
}

fn join(dependencies: &IndexSet<String>) -> String {
	dependencies
		.iter()
		.map(String::as_str)
		.collect::<Vec<_>>()
		.join(",")
}
