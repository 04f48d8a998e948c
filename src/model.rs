//! Bipartite graph model: two node groups, the evidence-tagged edges
//! between them, and the saved configuration snapshot.
//!
//! Node identity is positional. A group's members are `0..count`, and the
//! edge list is always the full `count(A) x count(B)` cross product. When a
//! count changes the edge list is rebuilt at defaults.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Smallest allowed group size.
pub const MIN_GROUP_COUNT: usize = 1;
/// Largest allowed group size.
pub const MAX_GROUP_COUNT: usize = 10;
/// Lower bound of an edge weight.
pub const MIN_WEIGHT: f64 = 0.5;
/// Upper bound of an edge weight.
pub const MAX_WEIGHT: f64 = 5.0;
/// Weight given to regenerated edges.
pub const DEFAULT_WEIGHT: f64 = 1.0;
/// Rotation slider bounds, in degrees.
pub const ROTATION_RANGE: (f64, f64) = (-180.0, 180.0);

const SAMPLE_NAMES_A: &[&str] = &["Gene1", "Gene2", "Gene3", "Protein1", "Enzyme1"];
const SAMPLE_NAMES_B: &[&str] = &["Disease1", "Disease2", "Symptom1", "Condition1", "Trait1"];
const SAMPLE_COLORS: &[&str] = &[
	"#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899",
];

/// Which side of the bipartition a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
	/// The left column.
	A,
	/// The right column.
	B,
}

/// A named group of nodes sharing one color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
	/// Display label, also the prefix of every node id.
	pub name: String,
	/// Number of nodes, kept within `[MIN_GROUP_COUNT, MAX_GROUP_COUNT]`.
	pub count: usize,
	/// CSS color string used as node fill.
	pub color: String,
}

impl NodeGroup {
	/// Build a group, clamping the count into range.
	pub fn new(name: impl Into<String>, count: usize, color: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			count: clamp_count(count),
			color: color.into(),
		}
	}
}

/// Clamp a group size into the supported range. Zero would leave the slot
/// spacing formula without members and is never allowed through.
pub fn clamp_count(count: usize) -> usize {
	count.clamp(MIN_GROUP_COUNT, MAX_GROUP_COUNT)
}

/// Clamp a weight into `[MIN_WEIGHT, MAX_WEIGHT]`; NaN falls back to the default.
pub fn clamp_weight(weight: f64) -> f64 {
	if weight.is_nan() {
		DEFAULT_WEIGHT
	} else {
		weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
	}
}

/// Ordinal confidence of an edge.
///
/// Labels outside the four known categories deserialize to
/// [`Evidence::Unknown`] instead of failing the whole configuration.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String")]
pub enum Evidence {
	/// Weakest category.
	Preliminary,
	/// Some support.
	Weak,
	/// Default for fresh edges.
	#[default]
	Moderate,
	/// Best supported.
	Strong,
	/// A category this app does not know; never offered in the editors.
	Unknown,
}

impl Evidence {
	/// All known categories in ascending order.
	pub const ALL: [Evidence; 4] = [
		Evidence::Preliminary,
		Evidence::Weak,
		Evidence::Moderate,
		Evidence::Strong,
	];

	/// The serialized and displayed name.
	pub fn label(self) -> &'static str {
		match self {
			Evidence::Preliminary => "Preliminary",
			Evidence::Weak => "Weak",
			Evidence::Moderate => "Moderate",
			Evidence::Strong => "Strong",
			Evidence::Unknown => "Unknown",
		}
	}

	/// Inverse of [`Evidence::label`] for the known categories.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|e| e.label() == label)
	}
}

impl From<String> for Evidence {
	fn from(label: String) -> Self {
		Self::from_label(&label).unwrap_or_else(|| {
			warn!("unknown evidence category {label:?}");
			Self::Unknown
		})
	}
}

impl fmt::Display for Evidence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// A weighted connection from a node of group A to a node of group B.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	/// Index into group A.
	pub from: usize,
	/// Index into group B.
	pub to: usize,
	/// Weight in `[MIN_WEIGHT, MAX_WEIGHT]`, drawn as stroke thickness.
	pub weight: f64,
	/// Confidence category, drawn as stroke color.
	pub evidence: Evidence,
}

impl Edge {
	/// A default-weight, moderate-evidence edge.
	pub fn new(from: usize, to: usize) -> Self {
		Self {
			from,
			to,
			weight: DEFAULT_WEIGHT,
			evidence: Evidence::default(),
		}
	}
}

/// The full cross product of both groups at default weight and evidence,
/// ordered by `from` then `to`.
pub fn complete_edges(count_a: usize, count_b: usize) -> Vec<Edge> {
	(0..count_a)
		.flat_map(|from| (0..count_b).map(move |to| Edge::new(from, to)))
		.collect()
}

/// True when `edges` covers every `(from, to)` pair of the two counts exactly once.
pub fn edges_match_counts(edges: &[Edge], count_a: usize, count_b: usize) -> bool {
	if edges.len() != count_a * count_b {
		return false;
	}
	let mut seen = vec![false; edges.len()];
	for edge in edges {
		if edge.from >= count_a || edge.to >= count_b {
			return false;
		}
		let slot = edge.from * count_b + edge.to;
		if std::mem::replace(&mut seen[slot], true) {
			return false;
		}
	}
	true
}

/// Copy of `edges` with every evidence set to `evidence`.
pub fn with_evidence(edges: &[Edge], evidence: Evidence) -> Vec<Edge> {
	edges
		.iter()
		.map(|edge| Edge {
			evidence,
			..edge.clone()
		})
		.collect()
}

/// Copy of `edges` with weights drawn uniformly from the weight range and
/// rounded to one decimal. `random` yields values in `[0, 1)`.
pub fn with_random_weights(edges: &[Edge], mut random: impl FnMut() -> f64) -> Vec<Edge> {
	edges
		.iter()
		.map(|edge| {
			let raw = random() * (MAX_WEIGHT - MIN_WEIGHT) + MIN_WEIGHT;
			Edge {
				weight: clamp_weight((raw * 10.0).round() / 10.0),
				..edge.clone()
			}
		})
		.collect()
}

/// A named, timestamped snapshot of the whole model; the unit of persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
	/// Storage key, assigned on save.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// User supplied title.
	pub title: String,
	/// Save time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<DateTime<Utc>>,
	/// Left group.
	pub group_a: NodeGroup,
	/// Right group.
	pub group_b: NodeGroup,
	/// Edge list, expected to match the group counts.
	pub edges: Vec<Edge>,
	/// Diagram rotation in degrees.
	pub rotation: f64,
}

/// The single owner of the editable graph state.
///
/// Controls hand it full replacement values; it keeps the edge list
/// consistent with the group counts and everything else is derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphModel {
	/// Left group.
	pub group_a: NodeGroup,
	/// Right group.
	pub group_b: NodeGroup,
	/// Always the full cross product of the group counts.
	pub edges: Vec<Edge>,
	/// Diagram rotation in degrees.
	pub rotation: f64,
}

impl Default for GraphModel {
	fn default() -> Self {
		let group_a = NodeGroup::new("Users", 3, "#3b82f6");
		let group_b = NodeGroup::new("Features", 4, "#ef4444");
		let edges = complete_edges(group_a.count, group_b.count);
		Self {
			group_a,
			group_b,
			edges,
			rotation: 0.0,
		}
	}
}

impl GraphModel {
	/// Replace one group. Returns true when the count changed and the edge
	/// set was regenerated, dropping every per-edge customization.
	pub fn set_group(&mut self, side: Side, group: NodeGroup) -> bool {
		let group = NodeGroup {
			count: clamp_count(group.count),
			..group
		};
		let slot = match side {
			Side::A => &mut self.group_a,
			Side::B => &mut self.group_b,
		};
		let resized = slot.count != group.count;
		*slot = group;
		if resized {
			self.regenerate_edges();
		}
		resized
	}

	/// Replace the edge list. Lists that do not match the counts are ignored.
	pub fn set_edges(&mut self, edges: Vec<Edge>) -> bool {
		if !edges_match_counts(&edges, self.group_a.count, self.group_b.count) {
			warn!("ignoring edge list of {} entries that does not match the groups", edges.len());
			return false;
		}
		self.edges = edges
			.into_iter()
			.map(|edge| Edge {
				weight: clamp_weight(edge.weight),
				..edge
			})
			.collect();
		true
	}

	/// Edit one edge in place. Returns false for an index past the end.
	pub fn update_edge(
		&mut self,
		index: usize,
		weight: Option<f64>,
		evidence: Option<Evidence>,
	) -> bool {
		let Some(edge) = self.edges.get_mut(index) else {
			return false;
		};
		if let Some(weight) = weight {
			edge.weight = clamp_weight(weight);
		}
		if let Some(evidence) = evidence {
			edge.evidence = evidence;
		}
		true
	}

	/// Set the diagram rotation, clamped to the slider range.
	pub fn set_rotation(&mut self, degrees: f64) {
		self.rotation = if degrees.is_finite() {
			degrees.clamp(ROTATION_RANGE.0, ROTATION_RANGE.1)
		} else {
			0.0
		};
	}

	/// Set every edge to the same evidence category.
	pub fn set_all_evidence(&mut self, evidence: Evidence) {
		self.edges = with_evidence(&self.edges, evidence);
	}

	/// Draw fresh weights for every edge.
	pub fn randomize_weights(&mut self, random: impl FnMut() -> f64) {
		self.edges = with_random_weights(&self.edges, random);
	}

	/// Replace both groups with sample names, counts in `3..=7` and palette colors.
	pub fn randomize_groups(&mut self, mut random: impl FnMut() -> f64) {
		let mut pick = |items: &[&str]| -> String {
			let i = ((random() * items.len() as f64) as usize).min(items.len() - 1);
			items[i].to_string()
		};
		let name_a = pick(SAMPLE_NAMES_A);
		let color_a = pick(SAMPLE_COLORS);
		let name_b = pick(SAMPLE_NAMES_B);
		let color_b = pick(SAMPLE_COLORS);
		let count_a = (random() * 5.0) as usize + 3;
		let count_b = (random() * 5.0) as usize + 3;

		self.set_group(Side::A, NodeGroup::new(name_a, count_a, color_a));
		self.set_group(Side::B, NodeGroup::new(name_b, count_b, color_b));
	}

	/// Snapshot the model under `title`, stamped with `now`.
	pub fn snapshot(&self, title: &str, now: DateTime<Utc>) -> GraphConfig {
		GraphConfig {
			id: Some(now.timestamp_millis().to_string()),
			title: title.to_string(),
			timestamp: Some(now),
			group_a: self.group_a.clone(),
			group_b: self.group_b.clone(),
			edges: self.edges.clone(),
			rotation: self.rotation,
		}
	}

	/// Replace the model with a loaded configuration, re-validating it.
	///
	/// Returns true when the configuration had to be repaired: a count or
	/// weight out of range, or an edge list that is not the cross product of
	/// the counts (which is then regenerated at defaults).
	pub fn load(&mut self, config: GraphConfig) -> bool {
		let GraphConfig {
			group_a,
			group_b,
			edges,
			rotation,
			..
		} = config;
		let mut repaired = false;

		for (side, group) in [(Side::A, group_a), (Side::B, group_b)] {
			repaired |= clamp_count(group.count) != group.count;
			let group = NodeGroup {
				count: clamp_count(group.count),
				..group
			};
			match side {
				Side::A => self.group_a = group,
				Side::B => self.group_b = group,
			}
		}

		if edges_match_counts(&edges, self.group_a.count, self.group_b.count) {
			repaired |= edges.iter().any(|e| clamp_weight(e.weight) != e.weight);
			self.set_edges(edges);
		} else {
			warn!(
				"loaded edge list does not cover {}x{}; regenerating",
				self.group_a.count, self.group_b.count
			);
			repaired = true;
			self.regenerate_edges();
		}

		repaired |= !rotation.is_finite();
		self.set_rotation(rotation);
		repaired
	}

	fn regenerate_edges(&mut self) {
		self.edges = complete_edges(self.group_a.count, self.group_b.count);
		debug!(
			"regenerated {} edges for {}x{}",
			self.edges.len(),
			self.group_a.count,
			self.group_b.count
		);
	}
}
