//! Visual encoding of weights, evidence and nodes.

use crate::model::Evidence;

pub const NODE_RADIUS: f64 = 20.0;
pub const NODE_STROKE: &str = "#fff";
pub const NODE_STROKE_WIDTH: f64 = 2.0;
pub const EDGE_OPACITY: f64 = 0.7;
pub const LABEL_FILL: &str = "black";
pub const LABEL_FONT: &str = "bold 12px sans-serif";
pub const BACKGROUND: &str = "#ffffff";

const STRONG: &str = "#10b981";
const MODERATE: &str = "#f59e0b";
const WEAK: &str = "#ef4444";
const GRAY: &str = "#6b7280";

/// Stroke color of an evidence category.
pub fn evidence_color(evidence: Evidence) -> &'static str {
	match evidence {
		Evidence::Strong => STRONG,
		Evidence::Moderate => MODERATE,
		Evidence::Weak => WEAK,
		Evidence::Preliminary | Evidence::Unknown => GRAY,
	}
}

/// Stroke width for an edge weight: `sqrt(weight) * 2`.
pub fn stroke_width(weight: f64) -> f64 {
	weight.max(0.0).sqrt() * 2.0
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{MAX_WEIGHT, MIN_WEIGHT};

	#[test]
	fn stroke_width_is_monotonic() {
		assert!(stroke_width(MIN_WEIGHT) < stroke_width(MAX_WEIGHT));
		let mut last = 0.0;
		for step in 0..=45 {
			let w = stroke_width(MIN_WEIGHT + step as f64 * 0.1);
			assert!(w >= last);
			last = w;
		}
		assert_eq!(stroke_width(1.0), 2.0);
		assert_eq!(stroke_width(-3.0), 0.0);
	}

	#[test]
	fn evidence_palette() {
		assert_eq!(evidence_color(Evidence::Strong), "#10b981");
		assert_eq!(evidence_color(Evidence::Moderate), "#f59e0b");
		assert_eq!(evidence_color(Evidence::Weak), "#ef4444");
		assert_eq!(evidence_color(Evidence::Preliminary), "#6b7280");
		assert_eq!(evidence_color(Evidence::Unknown), "#6b7280");
	}
}
