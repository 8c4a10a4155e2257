// SPDX-License-Identifier: Apache-2.0

//! The score propagator (`spec.md` §4.3) — the half of the engine the
//! size budget calls out as the hard part. Positive propagation pushes
//! a node's `positive_score` forward through outgoing edges (flipping
//! polarity on OPPOSE); negative propagation pushes attack evidence
//! sideways through `negative_score`. The two call each other, so
//! termination depends entirely on every admission rule requiring a
//! strict score change (`spec.md` §9 "cyclic recursion").
//!
//! Grounded on `core/update_score/positive.py` and
//! `core/update_score/negative.py` of the original backend, cleaned up
//! to the vocabulary `spec.md` §3–§4.3 settled on (`child_positive` /
//! `child_negative` internal aggregates vs. displayed `positive_score`
//! / `negative_score`).

use std::collections::HashMap;

use log::trace;

use crate::arithmetic::{approx_eq_opt, avg_ignore_absent, max_ignore_absent, min_ignore_absent, revert};
use crate::error::{Error, Result};
use crate::model::LogicType;
use crate::store::GraphStore;
use crate::uid::Uid;

/// What changed about a node's displayed scores during one operation.
/// The outer `Option` means "this field changed"; the inner one is the
/// field's new value, `None` meaning newly absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDelta {
	pub positive: Option<Option<f64>>,
	pub negative: Option<Option<f64>>,
}

/// Accumulates every node touched by one top-level operation; handed
/// back to the caller as the authoritative cache-invalidation diff
/// (`spec.md` §5 "the returned `updated_nodes` map").
pub type Updated = HashMap<Uid, ScoreDelta>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
	Positive,
	Negative,
}

/// Recursion is bounded by the depth cap at link-creation time (`spec.md`
/// §5), so this is never reached in practice; it exists as the circuit
/// breaker for the `Propagation` error kind (`spec.md` §7) rather than a
/// bound anyone is expected to hit.
const MAX_RECURSION_DEPTH: usize = 100_000;

pub struct Propagator<'a> {
	graph: &'a mut GraphStore,
	epsilon: f64,
}

impl<'a> Propagator<'a> {
	pub fn new(graph: &'a mut GraphStore, epsilon: f64) -> Self {
		Propagator { graph, epsilon }
	}

	/// Positive propagation from a node `n` (`spec.md` §4.3).
	pub fn propagate_positive_from(&mut self, n: Uid, is_refresh: bool, updated: &mut Updated) -> Result<()> {
		let p = self.graph.node(n)?.positive_score;
		for m in self.graph.outgoing_support(n)? {
			self.positive_recursive(m, Dir::Positive, p, is_refresh, 0, updated)?;
		}
		for m in self.graph.outgoing_oppose(n)? {
			self.positive_recursive(m, Dir::Negative, p, is_refresh, 0, updated)?;
		}
		Ok(())
	}

	fn positive_recursive(
		&mut self,
		m: Uid,
		dir: Dir,
		v: Option<f64>,
		is_refresh: bool,
		depth: usize,
		updated: &mut Updated,
	) -> Result<()> {
		if depth > MAX_RECURSION_DEPTH {
			return Err(Error::Propagation {
				node: m,
				detail: format!("positive propagation exceeded {MAX_RECURSION_DEPTH} levels"),
			});
		}
		let opinion = self.graph.node(m)?.clone();
		let (child_d, other) = match dir {
			Dir::Positive => (opinion.child_positive, opinion.child_negative),
			Dir::Negative => (opinion.child_negative, opinion.child_positive),
		};
		if v.is_none() && child_d.is_none() && other.is_none() {
			return Ok(());
		}

		let mut changed = false;
		match dir {
			Dir::Positive => {
				if is_refresh || v.is_none() {
					changed |= self.refresh_child_positive(m, updated)?;
				} else {
					let v = v.expect("checked above");
					let admits = match opinion.logic_type {
						LogicType::Or => child_d.is_none() || v > child_d.unwrap(),
						LogicType::And => child_d.is_none() || v < child_d.unwrap(),
					};
					trace!("node {m}: positive admission v={v} child_positive={child_d:?} admits={admits}");
					if admits {
						if opinion.is_and() {
							if let Some(old_min) = child_d {
								if v < old_min {
									trace!("node {m}: AND minimum dropped from {old_min} to {v}, reverting stale negative contribution");
									self.and_revert(m, old_min, v, updated)?;
								}
							}
						}
						self.graph.node_mut(m)?.child_positive = Some(v);
						changed = true;
					}
				}
			}
			Dir::Negative => {
				if is_refresh || v.is_none() {
					changed |= self.refresh_child_negative(m)?;
				} else {
					let v = v.expect("checked above");
					let admits = child_d.is_none() || v > child_d.unwrap();
					if admits {
						self.graph.node_mut(m)?.child_negative = Some(v);
						changed = true;
					}
				}
			}
		}

		if changed {
			let old_positive = self.graph.node(m)?.positive_score;
			let (cp, cn) = {
				let o = self.graph.node(m)?;
				(o.child_positive, o.child_negative)
			};
			let new_positive = avg_ignore_absent([cp, cn.map(revert)]);
			self.graph.node_mut(m)?.positive_score = new_positive;
			updated.entry(m).or_default().positive = Some(new_positive);
			trace!("node {m}: positive_score {old_positive:?} -> {new_positive:?}");

			for x in self.graph.outgoing_support(m)? {
				let x_child_positive = self.graph.node(x)?.child_positive;
				let refresh = approx_eq_opt(old_positive, x_child_positive, self.epsilon);
				self.positive_recursive(x, Dir::Positive, new_positive, refresh, depth + 1, updated)?;
			}
			for x in self.graph.outgoing_oppose(m)? {
				let x_child_negative = self.graph.node(x)?.child_negative;
				let refresh = approx_eq_opt(old_positive, x_child_negative, self.epsilon);
				self.positive_recursive(x, Dir::Negative, new_positive, refresh, depth + 1, updated)?;
			}

			self.propagate_negative_from(m, updated)?;
		}

		Ok(())
	}

	/// Recomputes `child_positive` from current incoming SUPPORT edges
	/// (OR-max / AND-min, `spec.md` §3 invariant 6). When an AND node's
	/// minimum rises, the previous minimum's retracted attack
	/// contribution must be dropped before the new minimum's is
	/// applied — the "AND-node revert subtlety" of `spec.md` §9.
	fn refresh_child_positive(&mut self, m: Uid, updated: &mut Updated) -> Result<bool> {
		let opinion = self.graph.node(m)?.clone();
		let supporters = self.graph.incoming_support(m)?;
		let mut values = Vec::with_capacity(supporters.len());
		for s in &supporters {
			values.push(self.graph.node(*s)?.positive_score);
		}
		let new_val = match opinion.logic_type {
			LogicType::Or => max_ignore_absent(values),
			LogicType::And => min_ignore_absent(values),
		};
		let old_val = opinion.child_positive;
		if approx_eq_opt(old_val, new_val, self.epsilon) {
			return Ok(false);
		}

		if opinion.is_and() {
			if let (Some(old), Some(new)) = (old_val, new_val) {
				if new > old {
					self.and_revert(m, old, new, updated)?;
				}
			}
		}

		self.graph.node_mut(m)?.child_positive = new_val;
		Ok(true)
	}

	/// Recomputes `child_negative` from current incoming OPPOSE edges
	/// (always max, `spec.md` §3 invariant 7).
	fn refresh_child_negative(&mut self, m: Uid) -> Result<bool> {
		let opinion = self.graph.node(m)?.clone();
		let attackers = self.graph.incoming_oppose(m)?;
		let mut values = Vec::with_capacity(attackers.len());
		for a in &attackers {
			values.push(self.graph.node(*a)?.positive_score);
		}
		let new_val = max_ignore_absent(values);
		let old_val = opinion.child_negative;
		if approx_eq_opt(old_val, new_val, self.epsilon) {
			return Ok(false);
		}
		self.graph.node_mut(m)?.child_negative = new_val;
		Ok(true)
	}

	/// Retracts the old minimum's inherited attack contribution and
	/// applies the new minimum's, per the AND-node revert subtlety.
	fn and_revert(&mut self, m: Uid, old_min: f64, new_min: f64, updated: &mut Updated) -> Result<()> {
		let supporters = self.graph.incoming_support(m)?;
		let m_negative = self.graph.node(m)?.negative_score;

		for s in &supporters {
			let sp = self.graph.node(*s)?.positive_score;
			if approx_eq_opt(sp, Some(old_min), self.epsilon) {
				self.negative_recursive(*s, None, updated)?;
			}
		}
		for s in &supporters {
			let sp = self.graph.node(*s)?.positive_score;
			if approx_eq_opt(sp, Some(new_min), self.epsilon) {
				self.negative_recursive(*s, m_negative, updated)?;
			}
		}
		Ok(())
	}

	/// Negative propagation from `n`: pushes attack evidence sideways
	/// into every node `n` points at, regardless of edge type
	/// (`spec.md` §4.3 "Negative propagation").
	pub fn propagate_negative_from(&mut self, n: Uid, updated: &mut Updated) -> Result<()> {
		let mut targets = self.graph.outgoing_support(n)?;
		targets.extend(self.graph.outgoing_oppose(n)?);
		for m in targets {
			self.negative_step(m, updated)?;
		}
		Ok(())
	}

	fn negative_step(&mut self, m: Uid, updated: &mut Updated) -> Result<()> {
		let opinion = self.graph.node(m)?.clone();
		if opinion.logic_type == LogicType::Or {
			for k in self.graph.incoming_support(m)? {
				self.negative_recursive(k, opinion.child_negative.map(revert), updated)?;
			}
		}
		for k in self.graph.incoming_oppose(m)? {
			self.negative_recursive(k, opinion.child_positive.map(revert), updated)?;
		}
		Ok(())
	}

	/// Re-derives and retracts the attack evidence a link used to
	/// carry; the entry point `delete_link` uses (`spec.md` §4.2).
	pub fn negative_refresh(&mut self, k: Uid, updated: &mut Updated) -> Result<()> {
		self.negative_recursive(k, None, updated)
	}

	/// Declares a deleted SUPPORT edge's contribution to `to` absent,
	/// forcing `to` to refresh `child_positive` from its remaining
	/// incoming edges (`spec.md` §4.2 "Delete link").
	pub fn retract_support(&mut self, to: Uid, updated: &mut Updated) -> Result<()> {
		self.positive_recursive(to, Dir::Positive, None, true, 0, updated)
	}

	/// Same as [`Propagator::retract_support`] for a deleted OPPOSE edge.
	pub fn retract_oppose(&mut self, to: Uid, updated: &mut Updated) -> Result<()> {
		self.positive_recursive(to, Dir::Negative, None, true, 0, updated)
	}

	fn negative_recursive(&mut self, k: Uid, s: Option<f64>, updated: &mut Updated) -> Result<()> {
		let mut s = s;
		if s.is_none() {
			let candidates = self.derive_negative_candidates(k)?;
			s = min_ignore_absent(candidates);
			let current = self.graph.node(k)?.negative_score;
			if s.is_none() && current.is_none() {
				return Ok(());
			}
		}

		let current = self.graph.node(k)?.negative_score;
		let admits = match (current, s) {
			(None, _) => true,
			(Some(_), None) => true,
			(Some(c), Some(sv)) => c > sv,
		};
		if !admits {
			return Ok(());
		}

		self.graph.node_mut(k)?.negative_score = s;
		updated.entry(k).or_default().negative = Some(s);

		let opinion = self.graph.node(k)?.clone();
		if opinion.logic_type == LogicType::Or {
			for j in self.graph.incoming_support(k)? {
				self.negative_recursive(j, opinion.negative_score, updated)?;
			}
		}
		for j in self.graph.incoming_oppose(k)? {
			self.negative_recursive(j, opinion.negative_score.map(revert), updated)?;
		}
		Ok(())
	}

	/// Candidate attack-strength contributions computed "by the same
	/// rules as the forward step" (`spec.md` §4.3), used to re-derive a
	/// retracted `negative_score` rather than assume absence.
	fn derive_negative_candidates(&self, k: Uid) -> Result<Vec<Option<f64>>> {
		let mut candidates = Vec::new();
		for x in self.graph.outgoing_support(k)? {
			let xo = self.graph.node(x)?;
			candidates.push(xo.negative_score);
			if xo.logic_type == LogicType::Or {
				candidates.push(xo.child_negative.map(revert));
			}
		}
		for x in self.graph.outgoing_oppose(k)? {
			let xo = self.graph.node(x)?;
			candidates.push(xo.negative_score.map(revert));
			candidates.push(xo.child_positive);
		}
		Ok(candidates)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{LogicType, NodeType, Opinion};

	fn leaf(positive: Option<f64>) -> Opinion {
		Opinion {
			uid: Uid::new(),
			content: "leaf".to_string(),
			logic_type: LogicType::Or,
			node_type: NodeType::Solid,
			positive_score: positive,
			negative_score: None,
			child_positive: None,
			child_negative: None,
			creator: "alice".to_string(),
			created_at: 0,
		}
	}

	fn root() -> Opinion {
		leaf(None)
	}

	#[test]
	fn or_support_aggregation() {
		let mut graph = GraphStore::new();
		let r = root();
		let a = leaf(Some(0.5));
		let b = leaf(Some(0.6));
		let (r_uid, a_uid, b_uid) = (r.uid, a.uid, b.uid);
		graph.insert_node(r);
		graph.insert_node(a);
		graph.insert_node(b);

		let mut updated = Updated::new();
		{
			let mut prop = Propagator::new(&mut graph, 1e-6);
			graph_link(&mut prop, a_uid, r_uid, crate::model::LinkType::Support);
			prop.propagate_positive_from(a_uid, false, &mut updated).unwrap();
			graph_link(&mut prop, b_uid, r_uid, crate::model::LinkType::Support);
			prop.propagate_positive_from(b_uid, false, &mut updated).unwrap();
		}

		let r = graph.node(r_uid).unwrap();
		assert_eq!(r.child_positive, Some(0.6));
		assert_eq!(r.positive_score, Some(0.6));
	}

	#[test]
	fn or_oppose_aggregation() {
		let mut graph = GraphStore::new();
		let r = root();
		let a = leaf(Some(0.5));
		let b = leaf(Some(0.6));
		let c = leaf(Some(0.4));
		let d = leaf(Some(0.6));
		let (r_uid, a_uid, b_uid, c_uid, d_uid) = (r.uid, a.uid, b.uid, c.uid, d.uid);
		graph.insert_node(r);
		graph.insert_node(a);
		graph.insert_node(b);
		graph.insert_node(c);
		graph.insert_node(d);

		let mut updated = Updated::new();
		let mut prop = Propagator::new(&mut graph, 1e-6);
		graph_link(&mut prop, a_uid, r_uid, crate::model::LinkType::Support);
		prop.propagate_positive_from(a_uid, false, &mut updated).unwrap();
		graph_link(&mut prop, b_uid, r_uid, crate::model::LinkType::Support);
		prop.propagate_positive_from(b_uid, false, &mut updated).unwrap();
		graph_link(&mut prop, c_uid, r_uid, crate::model::LinkType::Oppose);
		prop.propagate_positive_from(c_uid, false, &mut updated).unwrap();
		graph_link(&mut prop, d_uid, r_uid, crate::model::LinkType::Oppose);
		prop.propagate_positive_from(d_uid, false, &mut updated).unwrap();

		let r = graph.node(r_uid).unwrap();
		assert_eq!(r.child_negative, Some(0.6));
		assert!(approx_eq_opt(r.positive_score, Some(0.5), 1e-9));
	}

	// Test helper: links bypass the link engine's cycle/validation
	// checks since this module tests propagation in isolation.
	fn graph_link(prop: &mut Propagator, from: Uid, to: Uid, link_type: crate::model::LinkType) {
		prop.graph
			.insert_edge(crate::uid::LinkUid::new(), from, to, link_type)
			.unwrap();
	}
}
