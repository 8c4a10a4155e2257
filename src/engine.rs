// SPDX-License-Identifier: Apache-2.0

//! The top-level `Engine`: the single-writer-per-mutation surface of
//! `spec.md` §5 and §6, wrapping the graph and debate stores behind
//! one `RwLock` — the "global write lock" option the concurrency model
//! explicitly permits instead of per-component locking.

use std::sync::RwLock;

use log::debug;

use crate::config::EngineConfig;
use crate::debate_engine;
use crate::error::Result;
use crate::link_engine;
use crate::model::{LinkType, Opinion};
use crate::opinion_engine::{self, OpinionInfo, OpinionQuery};
use crate::propagate::Updated;
use crate::store::debate_store::{Debate, DebateQuery};
use crate::store::{DebateStore, GraphStore};
use crate::uid::{DebateUid, LinkUid, Uid};

struct EngineState {
	graph: GraphStore,
	debates: DebateStore,
}

/// The argument-graph scoring engine. Cheap to construct, expensive
/// per-mutation: every write method takes the lock exclusively for the
/// duration of its propagation (`spec.md` §5 "Concurrency").
pub struct Engine {
	state: RwLock<EngineState>,
	config: EngineConfig,
}

impl Engine {
	pub fn new(config: EngineConfig) -> Self {
		Engine {
			state: RwLock::new(EngineState {
				graph: GraphStore::new(),
				debates: DebateStore::new(),
			}),
			config,
		}
	}

	pub fn global_debate(&self) -> DebateUid {
		self.state.read().expect("engine lock poisoned").debates.global_debate()
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn create_or_opinion(
		&self,
		content: String,
		creator: String,
		debate_id: DebateUid,
		positive_score: Option<f64>,
	) -> Result<Uid> {
		let mut state = self.state.write().expect("engine lock poisoned");
		let EngineState { graph, debates } = &mut *state;
		debug!(target: "agora::opinion", "create_or_opinion debate={debate_id}");
		opinion_engine::create_or_opinion(graph, debates, &self.config, content, creator, debate_id, positive_score)
	}

	#[allow(clippy::too_many_arguments)]
	pub fn create_and_opinion(
		&self,
		parent_id: Uid,
		son_ids: Vec<Uid>,
		edge_type: LinkType,
		creator: String,
		debate_id: DebateUid,
	) -> Result<(Uid, Vec<LinkUid>, Updated)> {
		let mut state = self.state.write().expect("engine lock poisoned");
		let EngineState { graph, debates } = &mut *state;
		debug!(target: "agora::opinion", "create_and_opinion parent={parent_id} debate={debate_id}");
		opinion_engine::create_and_opinion(graph, debates, &self.config, parent_id, son_ids, edge_type, creator, debate_id)
	}

	pub fn delete_opinion(&self, opinion_id: Uid, debate_id: DebateUid) -> Result<Updated> {
		let mut state = self.state.write().expect("engine lock poisoned");
		let EngineState { graph, debates } = &mut *state;
		debug!(target: "agora::opinion", "delete_opinion {opinion_id} debate={debate_id}");
		opinion_engine::delete_opinion(graph, debates, &self.config, opinion_id, debate_id)
	}

	pub fn patch_opinion(
		&self,
		opinion_id: Uid,
		content: Option<String>,
		positive_score: Option<Option<f64>>,
	) -> Result<Updated> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::opinion", "patch_opinion {opinion_id}");
		opinion_engine::patch_opinion(&mut state.graph, &self.config, opinion_id, content, positive_score)
	}

	pub fn info_opinion(&self, opinion_id: Uid, with_edges: bool) -> Result<OpinionInfo> {
		let state = self.state.read().expect("engine lock poisoned");
		opinion_engine::info_opinion(&state.graph, opinion_id, with_edges)
	}

	pub fn query_opinion(&self, query: OpinionQuery) -> Result<Vec<Opinion>> {
		let state = self.state.read().expect("engine lock poisoned");
		opinion_engine::query_opinion(&state.graph, &state.debates, query)
	}

	pub fn head_opinion(&self, debate_id: DebateUid, is_root: bool) -> Result<Vec<Uid>> {
		let state = self.state.read().expect("engine lock poisoned");
		opinion_engine::head_opinion(&state.graph, &state.debates, debate_id, is_root)
	}

	pub fn create_link(&self, from_id: Uid, to_id: Uid, link_type: LinkType) -> Result<(LinkUid, Updated)> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::link", "create_link {from_id} -> {to_id}");
		link_engine::create_link(&mut state.graph, &self.config, from_id, to_id, link_type)
	}

	pub fn delete_link(&self, edge_id: LinkUid) -> Result<Updated> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::link", "delete_link {edge_id}");
		link_engine::delete_link(&mut state.graph, &self.config, edge_id)
	}

	pub fn patch_link(&self, edge_id: LinkUid, new_type: LinkType) -> Result<Updated> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::link", "patch_link {edge_id}");
		link_engine::patch_link(&mut state.graph, &self.config, edge_id, new_type)
	}

	pub fn attack_link(&self, edge_id: LinkUid, debate_id: DebateUid) -> Result<(Uid, Uid)> {
		let mut state = self.state.write().expect("engine lock poisoned");
		let EngineState { graph, debates } = &mut *state;
		debug!(target: "agora::link", "attack_link {edge_id} debate={debate_id}");
		link_engine::attack_link(graph, debates, &self.config, edge_id, debate_id)
	}

	pub fn create_debate(&self, name: String, creator: String, description: Option<String>) -> DebateUid {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::debate", "create_debate {name}");
		debate_engine::create_debate(&mut state.debates, name, creator, description)
	}

	pub fn delete_debate(&self, debate_id: DebateUid) -> Result<()> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debug!(target: "agora::debate", "delete_debate {debate_id}");
		debate_engine::delete_debate(&mut state.debates, debate_id)
	}

	pub fn info_debate(&self, debate_id: DebateUid) -> Result<Debate> {
		let state = self.state.read().expect("engine lock poisoned");
		debate_engine::info_debate(&state.debates, debate_id)
	}

	pub fn query_debate(&self, query: DebateQuery) -> Vec<Debate> {
		let state = self.state.read().expect("engine lock poisoned");
		debate_engine::query_debate(&state.debates, query)
	}

	pub fn patch_debate(
		&self,
		debate_id: DebateUid,
		name: Option<String>,
		description: Option<String>,
		creator: Option<String>,
	) -> Result<()> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debate_engine::patch_debate(&mut state.debates, debate_id, name, description, creator)
	}

	pub fn cite_in_debate(&self, debate_id: DebateUid, opinion_id: Uid) -> Result<bool> {
		let mut state = self.state.write().expect("engine lock poisoned");
		debate_engine::cite_in_debate(&mut state.debates, debate_id, opinion_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn or_support_scenario_through_the_engine() {
		let engine = Engine::new(EngineConfig::default());
		let debate = engine.global_debate();

		let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
		let a = engine
			.create_or_opinion("A".to_string(), "alice".to_string(), debate, Some(0.5))
			.unwrap();
		let b = engine
			.create_or_opinion("B".to_string(), "alice".to_string(), debate, Some(0.6))
			.unwrap();

		engine.create_link(a, r, LinkType::Support).unwrap();
		engine.create_link(b, r, LinkType::Support).unwrap();

		let info = engine.info_opinion(r, false).unwrap();
		assert_eq!(info.opinion.child_positive, Some(0.6));
		assert_eq!(info.opinion.positive_score, Some(0.6));
	}

	#[test]
	fn cycle_is_rejected_before_any_write() {
		let engine = Engine::new(EngineConfig::default());
		let debate = engine.global_debate();
		let a = engine.create_or_opinion("A".to_string(), "alice".to_string(), debate, Some(0.1)).unwrap();
		let b = engine.create_or_opinion("B".to_string(), "alice".to_string(), debate, Some(0.1)).unwrap();
		let c = engine.create_or_opinion("C".to_string(), "alice".to_string(), debate, Some(0.1)).unwrap();

		engine.create_link(a, b, LinkType::Support).unwrap();
		engine.create_link(b, c, LinkType::Support).unwrap();

		assert!(engine.create_link(c, a, LinkType::Support).is_err());
	}

	#[test]
	fn debate_lifecycle_through_the_engine() {
		let engine = Engine::new(EngineConfig::default());
		let debate = engine.create_debate("climate".to_string(), "alice".to_string(), None);

		let opinion = engine
			.create_or_opinion("emissions are falling".to_string(), "alice".to_string(), debate, Some(0.4))
			.unwrap();
		assert!(engine.info_opinion(opinion, false).is_ok());

		let found = engine.query_debate(crate::store::debate_store::DebateQuery {
			name: Some("clim".to_string()),
			..Default::default()
		});
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].uid, debate);

		assert!(engine.delete_debate(engine.global_debate()).is_err());
		engine.delete_debate(debate).unwrap();
	}
}
