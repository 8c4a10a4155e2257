// SPDX-License-Identifier: Apache-2.0

//! Graph topology and node/edge attribute storage (`spec.md` §6, §9
//! "two-store coupling"). Backed by [`petgraph::stable_graph::StableDiGraph`]
//! rather than the teacher's plain `Graph`, since opinions and links
//! are deleted during a session and a plain `Graph` invalidates indices
//! on removal.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::model::{LinkType, Opinion};
use crate::uid::{LinkUid, Uid};

#[derive(Debug, Clone, Copy)]
struct EdgeAttrs {
	uid: LinkUid,
	link_type: LinkType,
}

/// All edges incident to a node, grouped the way `info_opinion` reports
/// them (`spec.md` §4.1 "Query / Info").
#[derive(Debug, Default, Clone)]
pub struct IncidentEdges {
	pub supports: Vec<Uid>,
	pub opposes: Vec<Uid>,
	pub supported_by: Vec<Uid>,
	pub opposed_by: Vec<Uid>,
}

#[derive(Debug, Default)]
pub struct GraphStore {
	graph: StableDiGraph<Opinion, EdgeAttrs>,
	nodes: HashMap<Uid, NodeIndex>,
	edges: HashMap<LinkUid, EdgeIndex>,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_node(&mut self, opinion: Opinion) {
		let uid = opinion.uid;
		let idx = self.graph.add_node(opinion);
		self.nodes.insert(uid, idx);
	}

	pub fn contains_node(&self, uid: Uid) -> bool {
		self.nodes.contains_key(&uid)
	}

	pub fn node(&self, uid: Uid) -> Result<&Opinion> {
		let idx = self.index_of(uid)?;
		Ok(&self.graph[idx])
	}

	pub fn node_mut(&mut self, uid: Uid) -> Result<&mut Opinion> {
		let idx = self.index_of(uid)?;
		Ok(&mut self.graph[idx])
	}

	/// Removes a node and every edge incident to it, returning the
	/// removed attributes.
	pub fn remove_node(&mut self, uid: Uid) -> Result<Opinion> {
		let idx = self.index_of(uid)?;

		let incident: Vec<EdgeIndex> = self
			.graph
			.edges_directed(idx, Direction::Incoming)
			.chain(self.graph.edges_directed(idx, Direction::Outgoing))
			.map(|e| e.id())
			.collect();
		for edge_idx in incident {
			if let Some(attrs) = self.graph.edge_weight(edge_idx) {
				self.edges.remove(&attrs.uid);
			}
		}

		let opinion = self.graph.remove_node(idx).ok_or_else(|| {
			Error::GraphStore(format!("opinion {uid} present in side table but missing from graph"))
		})?;
		self.nodes.remove(&uid);
		Ok(opinion)
	}

	/// True if adding `from -> to` would close a cycle, i.e. `to` can
	/// already reach `from` (`spec.md` §3 invariant 1, §4.2 "Create link").
	pub fn would_cycle(&self, from: Uid, to: Uid) -> Result<bool> {
		if from == to {
			return Ok(true);
		}
		let from_idx = self.index_of(from)?;
		let to_idx = self.index_of(to)?;

		let mut stack = vec![to_idx];
		let mut seen = std::collections::HashSet::new();
		while let Some(cur) = stack.pop() {
			if cur == from_idx {
				return Ok(true);
			}
			if !seen.insert(cur) {
				continue;
			}
			stack.extend(self.graph.neighbors_directed(cur, Direction::Outgoing));
		}
		Ok(false)
	}

	/// Longest path ending at `uid`, counted in edges; used to enforce
	/// the depth cap of `spec.md` §5 before a new edge is admitted.
	pub fn depth_of(&self, uid: Uid) -> Result<usize> {
		let idx = self.index_of(uid)?;
		let mut memo = HashMap::new();
		Ok(self.longest_incoming_path(idx, &mut memo))
	}

	fn longest_incoming_path(
		&self,
		idx: NodeIndex,
		memo: &mut HashMap<NodeIndex, usize>,
	) -> usize {
		if let Some(&d) = memo.get(&idx) {
			return d;
		}
		let depth = self
			.graph
			.neighbors_directed(idx, Direction::Incoming)
			.map(|p| 1 + self.longest_incoming_path(p, memo))
			.max()
			.unwrap_or(0);
		memo.insert(idx, depth);
		depth
	}

	pub fn has_edge(&self, from: Uid, to: Uid, link_type: LinkType) -> Result<Option<LinkUid>> {
		let from_idx = self.index_of(from)?;
		let to_idx = self.index_of(to)?;
		Ok(self
			.graph
			.edges_directed(from_idx, Direction::Outgoing)
			.find(|e| e.target() == to_idx && e.weight().link_type == link_type)
			.map(|e| e.weight().uid))
	}

	pub fn insert_edge(&mut self, uid: LinkUid, from: Uid, to: Uid, link_type: LinkType) -> Result<()> {
		let from_idx = self.index_of(from)?;
		let to_idx = self.index_of(to)?;
		let edge_idx = self.graph.add_edge(from_idx, to_idx, EdgeAttrs { uid, link_type });
		self.edges.insert(uid, edge_idx);
		Ok(())
	}

	/// Removes an edge, returning its `(from, to, type)`.
	pub fn remove_edge(&mut self, uid: LinkUid) -> Result<(Uid, Uid, LinkType)> {
		let edge_idx = *self.edges.get(&uid).ok_or(Error::LinkNotFound(uid))?;
		let (from_idx, to_idx) = self.graph.edge_endpoints(edge_idx).ok_or_else(|| {
			Error::GraphStore(format!("link {uid} present in side table but missing from graph"))
		})?;
		let attrs = *self.graph.edge_weight(edge_idx).ok_or_else(|| {
			Error::GraphStore(format!("link {uid} present in side table but missing from graph"))
		})?;
		self.graph.remove_edge(edge_idx);
		self.edges.remove(&uid);
		let from = self.graph[from_idx].uid;
		let to = self.graph[to_idx].uid;
		Ok((from, to, attrs.link_type))
	}

	pub fn edge_endpoints(&self, uid: LinkUid) -> Result<(Uid, Uid, LinkType)> {
		let edge_idx = *self.edges.get(&uid).ok_or(Error::LinkNotFound(uid))?;
		let (from_idx, to_idx) = self.graph.edge_endpoints(edge_idx).ok_or_else(|| {
			Error::GraphStore(format!("link {uid} present in side table but missing from graph"))
		})?;
		let attrs = *self.graph.edge_weight(edge_idx).ok_or_else(|| {
			Error::GraphStore(format!("link {uid} present in side table but missing from graph"))
		})?;
		Ok((self.graph[from_idx].uid, self.graph[to_idx].uid, attrs.link_type))
	}

	/// Supporters: nodes with a SUPPORT edge into `uid`.
	pub fn incoming_support(&self, uid: Uid) -> Result<Vec<Uid>> {
		self.incoming_of_type(uid, LinkType::Support)
	}

	/// Attackers: nodes with an OPPOSE edge into `uid`.
	pub fn incoming_oppose(&self, uid: Uid) -> Result<Vec<Uid>> {
		self.incoming_of_type(uid, LinkType::Oppose)
	}

	/// Nodes `uid` supports (outgoing SUPPORT edges).
	pub fn outgoing_support(&self, uid: Uid) -> Result<Vec<Uid>> {
		self.outgoing_of_type(uid, LinkType::Support)
	}

	/// Nodes `uid` opposes (outgoing OPPOSE edges).
	pub fn outgoing_oppose(&self, uid: Uid) -> Result<Vec<Uid>> {
		self.outgoing_of_type(uid, LinkType::Oppose)
	}

	fn incoming_of_type(&self, uid: Uid, link_type: LinkType) -> Result<Vec<Uid>> {
		let idx = self.index_of(uid)?;
		Ok(self
			.graph
			.edges_directed(idx, Direction::Incoming)
			.filter(|e| e.weight().link_type == link_type)
			.map(|e| self.graph[e.source()].uid)
			.collect())
	}

	fn outgoing_of_type(&self, uid: Uid, link_type: LinkType) -> Result<Vec<Uid>> {
		let idx = self.index_of(uid)?;
		Ok(self
			.graph
			.edges_directed(idx, Direction::Outgoing)
			.filter(|e| e.weight().link_type == link_type)
			.map(|e| self.graph[e.target()].uid)
			.collect())
	}

	pub fn is_leaf(&self, uid: Uid) -> Result<bool> {
		let idx = self.index_of(uid)?;
		Ok(self.graph.edges_directed(idx, Direction::Incoming).next().is_none())
	}

	pub fn is_root(&self, uid: Uid) -> Result<bool> {
		let idx = self.index_of(uid)?;
		Ok(self.graph.edges_directed(idx, Direction::Outgoing).next().is_none())
	}

	pub fn incident_edges(&self, uid: Uid) -> Result<IncidentEdges> {
		Ok(IncidentEdges {
			supports: self.outgoing_support(uid)?,
			opposes: self.outgoing_oppose(uid)?,
			supported_by: self.incoming_support(uid)?,
			opposed_by: self.incoming_oppose(uid)?,
		})
	}

	pub fn all_uids(&self) -> impl Iterator<Item = Uid> + '_ {
		self.graph.node_weights().map(|o| o.uid)
	}

	fn index_of(&self, uid: Uid) -> Result<NodeIndex> {
		self.nodes.get(&uid).copied().ok_or(Error::OpinionNotFound(uid))
	}
}
