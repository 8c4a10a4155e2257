// SPDX-License-Identifier: Apache-2.0

//! The opinion engine (`spec.md` §4.1): creating OR opinions and AND
//! groups, deleting nodes, patching leaf scores, and the query/info
//! surface.

use log::warn;

use crate::arithmetic::{approx_eq_opt, min_ignore_absent};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{LogicType, NodeType, Opinion, AND_OPPOSE_MARKER, AND_SUPPORT_MARKER};
use crate::model::LinkType;
use crate::propagate::{Propagator, Updated};
use crate::store::graph_store::IncidentEdges;
use crate::store::{DebateStore, GraphStore};
use crate::uid::{DebateUid, LinkUid, Uid};

/// Attributes and, optionally, incident edges of an opinion — the
/// shape `info_opinion` returns (`spec.md` §4.1 "Query / Info").
#[derive(Debug, Clone)]
pub struct OpinionInfo {
	pub opinion: Opinion,
	pub edges: Option<IncidentEdges>,
}

/// Ordering for `query_opinion` (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
	CreatedAtAsc,
	CreatedAtDesc,
	PositiveScoreDesc,
}

#[derive(Debug, Clone, Default)]
pub struct OpinionQuery {
	pub substring: Option<String>,
	pub debate_id: Option<DebateUid>,
	pub min_score: Option<f64>,
	pub max_score: Option<f64>,
	pub order: Option<QueryOrder>,
	pub limit: Option<usize>,
}

pub(crate) fn now_millis() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or(0)
}

fn validate_score(score: Option<f64>) -> Result<()> {
	if let Some(s) = score {
		if !(0.0..=1.0).contains(&s) {
			return Err(Error::ScoreOutOfRange(s));
		}
	}
	Ok(())
}

/// `create_or_opinion` (`spec.md` §4.1 "Create OR").
pub fn create_or_opinion(
	graph: &mut GraphStore,
	debates: &mut DebateStore,
	config: &EngineConfig,
	content: String,
	creator: String,
	debate_id: DebateUid,
	positive_score: Option<f64>,
) -> Result<Uid> {
	if content.is_empty() {
		return Err(Error::EmptyOrContent);
	}
	if config.is_reserved_creator(&creator) {
		return Err(Error::ReservedCreatorName(creator));
	}
	validate_score(positive_score)?;

	let uid = Uid::new();
	let opinion = Opinion {
		uid,
		content,
		logic_type: LogicType::Or,
		node_type: NodeType::Solid,
		positive_score,
		negative_score: None,
		child_positive: None,
		child_negative: None,
		creator,
		created_at: now_millis(),
	};
	graph.insert_node(opinion);
	debates.add_member(debate_id, uid)?;
	Ok(uid)
}

/// `create_and_opinion` (`spec.md` §4.1 "Create AND group").
#[allow(clippy::too_many_arguments)]
pub fn create_and_opinion(
	graph: &mut GraphStore,
	debates: &mut DebateStore,
	config: &EngineConfig,
	parent_id: Uid,
	son_ids: Vec<Uid>,
	edge_type: LinkType,
	creator: String,
	debate_id: DebateUid,
) -> Result<(Uid, Vec<LinkUid>, Updated)> {
	if son_ids.is_empty() {
		return Err(Error::EmptyAndGroup);
	}
	if config.is_reserved_creator(&creator) {
		return Err(Error::ReservedCreatorName(creator));
	}

	let parent = graph.node(parent_id)?;
	if parent.logic_type == LogicType::And {
		return Err(Error::AndUnderAnd(parent_id));
	}
	for son in &son_ids {
		let son_opinion = graph.node(*son)?;
		if son_opinion.node_type != NodeType::Solid {
			return Err(Error::NotSolid(*son));
		}
	}

	let content = match edge_type {
		LinkType::Support => AND_SUPPORT_MARKER.to_string(),
		LinkType::Oppose => AND_OPPOSE_MARKER.to_string(),
	};

	let and_uid = Uid::new();
	let and_opinion = Opinion {
		uid: and_uid,
		content,
		logic_type: LogicType::And,
		node_type: NodeType::Empty,
		positive_score: None,
		negative_score: None,
		child_positive: None,
		child_negative: None,
		creator,
		created_at: now_millis(),
	};
	graph.insert_node(and_opinion);
	debates.add_member(debate_id, and_uid)?;

	let mut edge_ids = Vec::with_capacity(son_ids.len() + 1);

	let parent_link = LinkUid::new();
	graph.insert_edge(parent_link, and_uid, parent_id, edge_type)?;
	edge_ids.push(parent_link);

	let mut son_scores = Vec::with_capacity(son_ids.len());
	for son in &son_ids {
		let link = LinkUid::new();
		graph.insert_edge(link, *son, and_uid, LinkType::Support)?;
		edge_ids.push(link);
		son_scores.push(graph.node(*son)?.positive_score);
	}

	let child_positive = min_ignore_absent(son_scores);
	{
		let and_mut = graph.node_mut(and_uid)?;
		and_mut.child_positive = child_positive;
		and_mut.positive_score = child_positive;
	}

	let mut updated = Updated::new();
	updated.entry(and_uid).or_default().positive = Some(child_positive);

	let mut propagator = Propagator::new(graph, config.score_epsilon);
	propagator.propagate_positive_from(and_uid, false, &mut updated)?;

	Ok((and_uid, edge_ids, updated))
}

/// `delete_opinion` (`spec.md` §4.1 "Delete node").
pub fn delete_opinion(
	graph: &mut GraphStore,
	debates: &mut DebateStore,
	config: &EngineConfig,
	opinion_id: Uid,
	debate_id: DebateUid,
) -> Result<Updated> {
	let is_global = debate_id == debates.global_debate();
	if !is_global {
		debates.remove_member(debate_id, opinion_id)?;
		return Ok(Updated::new());
	}

	let mut updated = Updated::new();
	let mut former_children = graph.incoming_support(opinion_id)?;
	former_children.extend(graph.incoming_oppose(opinion_id)?);

	graph.node_mut(opinion_id)?.positive_score = None;
	{
		let mut propagator = Propagator::new(graph, config.score_epsilon);
		propagator.propagate_positive_from(opinion_id, true, &mut updated)?;
	}

	graph.remove_node(opinion_id)?;
	debates.remove_everywhere(opinion_id);

	let surviving_children: Vec<Uid> = former_children
		.into_iter()
		.filter(|uid| graph.contains_node(*uid))
		.collect();

	let mut propagator = Propagator::new(graph, config.score_epsilon);
	for child in surviving_children {
		propagator.negative_refresh(child, &mut updated)?;
	}

	Ok(updated)
}

/// `patch_opinion` restricted to leaf score edits (`spec.md` §4.1
/// "Patch leaf score"). Renaming a non-leaf's `content` is allowed;
/// rescoring it is not.
pub fn patch_opinion(
	graph: &mut GraphStore,
	config: &EngineConfig,
	opinion_id: Uid,
	content: Option<String>,
	positive_score: Option<Option<f64>>,
) -> Result<Updated> {
	if let Some(score) = positive_score {
		if !graph.is_leaf(opinion_id)? {
			return Err(Error::NotALeaf(opinion_id));
		}
		validate_score(score)?;
		let current = graph.node(opinion_id)?.positive_score;
		if approx_eq_opt(current, score, config.score_epsilon) {
			warn!("patch_opinion {opinion_id}: requested score already equals the current value, propagating anyway");
		}
		graph.node_mut(opinion_id)?.positive_score = score;
	}
	if let Some(content) = content {
		if content.is_empty() {
			return Err(Error::EmptyOrContent);
		}
		graph.node_mut(opinion_id)?.content = content;
	}

	let mut updated = Updated::new();
	if positive_score.is_some() {
		let mut propagator = Propagator::new(graph, config.score_epsilon);
		propagator.propagate_positive_from(opinion_id, true, &mut updated)?;
	}
	Ok(updated)
}

pub fn info_opinion(
	graph: &GraphStore,
	opinion_id: Uid,
	with_edges: bool,
) -> Result<OpinionInfo> {
	let opinion = graph.node(opinion_id)?.clone();
	let edges = if with_edges {
		Some(graph.incident_edges(opinion_id)?)
	} else {
		None
	};
	Ok(OpinionInfo { opinion, edges })
}

pub fn query_opinion(graph: &GraphStore, debates: &DebateStore, query: OpinionQuery) -> Result<Vec<Opinion>> {
	let mut results: Vec<Opinion> = graph
		.all_uids()
		.filter_map(|uid| graph.node(uid).ok().cloned())
		.filter(|o| {
			query
				.substring
				.as_ref()
				.map(|s| o.content.contains(s.as_str()))
				.unwrap_or(true)
		})
		.filter(|o| {
			query
				.debate_id
				.map(|d| debates.is_member(d, o.uid))
				.unwrap_or(true)
		})
		.filter(|o| {
			query
				.min_score
				.map(|min| o.positive_score.map(|p| p >= min).unwrap_or(false))
				.unwrap_or(true)
		})
		.filter(|o| {
			query
				.max_score
				.map(|max| o.positive_score.map(|p| p <= max).unwrap_or(false))
				.unwrap_or(true)
		})
		.collect();

	match query.order {
		Some(QueryOrder::CreatedAtAsc) => results.sort_by_key(|o| o.created_at),
		Some(QueryOrder::CreatedAtDesc) => results.sort_by_key(|o| std::cmp::Reverse(o.created_at)),
		Some(QueryOrder::PositiveScoreDesc) => {
			results.sort_by(|a, b| b.positive_score.partial_cmp(&a.positive_score).unwrap_or(std::cmp::Ordering::Equal))
		}
		None => {}
	}

	if let Some(limit) = query.limit {
		results.truncate(limit);
	}
	Ok(results)
}

/// `head_opinion`: roots have no outgoing edges, leaves have no
/// incoming edges (`spec.md` §6).
pub fn head_opinion(graph: &GraphStore, debates: &DebateStore, debate_id: DebateUid, is_root: bool) -> Result<Vec<Uid>> {
	let mut result = Vec::new();
	for uid in graph.all_uids() {
		if !debates.is_member(debate_id, uid) {
			continue;
		}
		let matches = if is_root { graph.is_root(uid)? } else { graph.is_leaf(uid)? };
		if matches {
			result.push(uid);
		}
	}
	Ok(result)
}
