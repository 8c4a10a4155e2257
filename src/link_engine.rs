// SPDX-License-Identifier: Apache-2.0

//! The link engine (`spec.md` §4.2): creating, deleting, retyping, and
//! "attacking" edges between opinions.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{LinkType, LogicType, NodeType, Opinion, AND_OPPOSE_MARKER, AND_SUPPORT_MARKER};
use crate::opinion_engine::{create_or_opinion, now_millis};
use crate::propagate::{Propagator, Updated};
use crate::store::{DebateStore, GraphStore};
use crate::uid::{DebateUid, LinkUid, Uid};

/// `create_link` (`spec.md` §4.2 "Create link"). Idempotent: an
/// existing edge of the same type between the same endpoints is
/// returned as-is rather than surfaced as a conflict.
pub fn create_link(
	graph: &mut GraphStore,
	config: &EngineConfig,
	from_id: Uid,
	to_id: Uid,
	link_type: LinkType,
) -> Result<(LinkUid, Updated)> {
	if from_id == to_id {
		return Err(Error::SelfLoop(from_id));
	}
	if graph.node(from_id)?.logic_type == LogicType::And {
		return Err(Error::AndNodeLinkTarget(from_id));
	}
	if graph.node(to_id)?.logic_type == LogicType::And {
		return Err(Error::AndNodeLinkTarget(to_id));
	}

	if let Some(existing) = graph.has_edge(from_id, to_id, link_type)? {
		return Ok((existing, Updated::new()));
	}

	if graph.would_cycle(from_id, to_id)? {
		return Err(Error::Cycle { from: from_id, to: to_id });
	}

	let depth = graph.depth_of(from_id)? + 1;
	if depth > config.max_link_depth {
		return Err(Error::DepthExceeded { max: config.max_link_depth });
	}

	let link_uid = LinkUid::new();
	graph.insert_edge(link_uid, from_id, to_id, link_type)?;

	let mut updated = Updated::new();
	let mut propagator = Propagator::new(graph, config.score_epsilon);
	propagator.propagate_positive_from(from_id, false, &mut updated)?;

	Ok((link_uid, updated))
}

/// `delete_link` (`spec.md` §4.2 "Delete link").
pub fn delete_link(graph: &mut GraphStore, config: &EngineConfig, edge_id: LinkUid) -> Result<Updated> {
	let (from_id, to_id, link_type) = graph.edge_endpoints(edge_id)?;
	graph.remove_edge(edge_id)?;

	let mut updated = Updated::new();
	let mut propagator = Propagator::new(graph, config.score_epsilon);
	match link_type {
		LinkType::Support => propagator.retract_support(to_id, &mut updated)?,
		LinkType::Oppose => propagator.retract_oppose(to_id, &mut updated)?,
	}
	propagator.negative_refresh(from_id, &mut updated)?;

	Ok(updated)
}

/// `patch_link` (`spec.md` §4.2 "Retype link").
pub fn patch_link(graph: &mut GraphStore, config: &EngineConfig, edge_id: LinkUid, new_type: LinkType) -> Result<Updated> {
	let (from_id, to_id, old_type) = graph.edge_endpoints(edge_id)?;
	if new_type == old_type {
		return Ok(Updated::new());
	}

	graph.remove_edge(edge_id)?;
	graph.insert_edge(edge_id, from_id, to_id, new_type)?;

	let mut updated = Updated::new();
	let mut propagator = Propagator::new(graph, config.score_epsilon);
	propagator.propagate_positive_from(from_id, true, &mut updated)?;
	Ok(updated)
}

/// `attack_link` (`spec.md` §4.2 "Attack link"). Materialises the
/// reasoning step `from -> to` as its own attackable OR node, grouped
/// with `from` under a new AND so the pre-existing propagated value at
/// `to` is preserved exactly rather than re-derived.
pub fn attack_link(
	graph: &mut GraphStore,
	debates: &mut DebateStore,
	config: &EngineConfig,
	edge_id: LinkUid,
	debate_id: DebateUid,
) -> Result<(Uid, Uid)> {
	let (from_id, to_id, link_type) = graph.edge_endpoints(edge_id)?;
	let to_opinion = graph.node(to_id)?.clone();
	if to_opinion.logic_type == LogicType::And {
		return Err(Error::AndNodeLinkTarget(to_id));
	}
	let from_opinion: Opinion = graph.node(from_id)?.clone();

	graph.remove_edge(edge_id)?;

	let reasoning_content = format!("{} \u{2192} {}", from_opinion.content, to_opinion.content);
	let r_uid = create_or_opinion(
		graph,
		debates,
		config,
		reasoning_content,
		from_opinion.creator.clone(),
		debate_id,
		Some(1.0),
	)?;

	let and_uid = Uid::new();
	let and_opinion = Opinion {
		uid: and_uid,
		content: match link_type {
			LinkType::Support => AND_SUPPORT_MARKER.to_string(),
			LinkType::Oppose => AND_OPPOSE_MARKER.to_string(),
		},
		logic_type: LogicType::And,
		node_type: NodeType::Empty,
		positive_score: from_opinion.positive_score,
		negative_score: from_opinion.negative_score,
		child_positive: from_opinion.positive_score,
		child_negative: None,
		creator: from_opinion.creator.clone(),
		created_at: now_millis(),
	};
	graph.insert_node(and_opinion);
	debates.add_member(debate_id, and_uid)?;

	graph.insert_edge(LinkUid::new(), and_uid, to_id, link_type)?;
	graph.insert_edge(LinkUid::new(), r_uid, and_uid, LinkType::Support)?;
	graph.insert_edge(LinkUid::new(), from_id, and_uid, LinkType::Support)?;

	Ok((r_uid, and_uid))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::GraphStore;

	fn leaf(graph: &mut GraphStore, positive: f64) -> Uid {
		let uid = Uid::new();
		graph.insert_node(Opinion {
			uid,
			content: "leaf".to_string(),
			logic_type: LogicType::Or,
			node_type: NodeType::Solid,
			positive_score: Some(positive),
			negative_score: None,
			child_positive: None,
			child_negative: None,
			creator: "alice".to_string(),
			created_at: 0,
		});
		uid
	}

	#[test]
	fn create_link_rejects_self_loop() {
		let mut graph = GraphStore::new();
		let config = EngineConfig::default();
		let a = leaf(&mut graph, 0.5);
		assert_eq!(
			create_link(&mut graph, &config, a, a, LinkType::Support).unwrap_err(),
			Error::SelfLoop(a)
		);
	}

	#[test]
	fn create_link_rejects_cycle() {
		let mut graph = GraphStore::new();
		let config = EngineConfig::default();
		let a = leaf(&mut graph, 0.5);
		let b = leaf(&mut graph, 0.5);
		create_link(&mut graph, &config, a, b, LinkType::Support).unwrap();
		assert!(matches!(
			create_link(&mut graph, &config, b, a, LinkType::Support).unwrap_err(),
			Error::Cycle { .. }
		));
	}

	#[test]
	fn create_link_is_idempotent() {
		let mut graph = GraphStore::new();
		let config = EngineConfig::default();
		let a = leaf(&mut graph, 0.5);
		let b = leaf(&mut graph, 0.6);
		let (first, _) = create_link(&mut graph, &config, a, b, LinkType::Support).unwrap();
		let (second, updated) = create_link(&mut graph, &config, a, b, LinkType::Support).unwrap();
		assert_eq!(first, second);
		assert!(updated.is_empty());
	}

	#[test]
	fn delete_link_retracts_contribution() {
		let mut graph = GraphStore::new();
		let config = EngineConfig::default();
		let a = leaf(&mut graph, 0.5);
		let b = leaf(&mut graph, 0.6);
		let r = leaf(&mut graph, 0.0);
		graph.node_mut(r).unwrap().positive_score = None;
		let (link, _) = create_link(&mut graph, &config, a, r, LinkType::Support).unwrap();
		create_link(&mut graph, &config, b, r, LinkType::Support).unwrap();
		assert_eq!(graph.node(r).unwrap().child_positive, Some(0.6));

		delete_link(&mut graph, &config, link).unwrap();
		assert_eq!(graph.node(r).unwrap().child_positive, Some(0.6));
	}
}
