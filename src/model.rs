// SPDX-License-Identifier: Apache-2.0

//! The data model of `spec.md` §3: opinions (nodes), links (edges),
//! and the sum types the original Python backend encoded as strings.

use serde::{Deserialize, Serialize};

use crate::uid::Uid;

/// An OR node disjoins its supporters; an AND node conjoins its operands.
/// Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicType {
	Or,
	And,
}

/// `Solid` nodes carry a standalone truth value; `Empty` nodes exist
/// only to group operands (AND nodes are always `Empty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
	Solid,
	Empty,
}

/// The type of a directed edge between two opinions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
	Support,
	Oppose,
}

impl LinkType {
	pub fn as_str(&self) -> &'static str {
		match self {
			LinkType::Support => "support",
			LinkType::Oppose => "oppose",
		}
	}
}

impl std::str::FromStr for LinkType {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"support" => Ok(LinkType::Support),
			"oppose" => Ok(LinkType::Oppose),
			other => Err(crate::error::Error::UnknownEdgeType(other.to_string())),
		}
	}
}

/// An opinion node. See `spec.md` §3 invariants 1-8 for the
/// constraints an engine operation must uphold over this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opinion {
	pub uid: Uid,
	pub content: String,
	pub logic_type: LogicType,
	pub node_type: NodeType,
	pub positive_score: Option<f64>,
	pub negative_score: Option<f64>,
	pub child_positive: Option<f64>,
	pub child_negative: Option<f64>,
	pub creator: String,
	/// Milliseconds since the Unix epoch.
	pub created_at: u64,
}

impl Opinion {
	/// Shorthand for `logic_type == LogicType::And`, used at the
	/// propagator's AND-specific branch points (`spec.md` §4.3).
	pub fn is_and(&self) -> bool {
		self.logic_type == LogicType::And
	}
}

/// The fixed markers AND nodes use as their `content` (`spec.md` §4.1).
pub const AND_SUPPORT_MARKER: &str = "&";
pub const AND_OPPOSE_MARKER: &str = "&\u{00ac}";
