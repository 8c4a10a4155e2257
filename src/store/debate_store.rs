// SPDX-License-Identifier: Apache-2.0

//! Debate membership (`spec.md` §3 "Debate", §9 "Global state"). A
//! debate is a named set of opinions; the global debate is a
//! process-wide singleton whose membership is a superset of every
//! other debate's.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::uid::{DebateUid, Uid};

#[derive(Debug, Clone)]
pub struct Debate {
	pub uid: DebateUid,
	pub name: String,
	pub description: Option<String>,
	pub creator: String,
	pub is_all: bool,
	pub created_at: u64,
	members: HashSet<Uid>,
}

impl Debate {
	pub fn members(&self) -> impl Iterator<Item = Uid> + '_ {
		self.members.iter().copied()
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
}

/// Filter parameters for [`DebateStore::query`], mirroring
/// `original_source/backend/core/debate.py`'s `query_debate`.
#[derive(Debug, Clone, Default)]
pub struct DebateQuery {
	pub uid: Option<DebateUid>,
	pub name: Option<String>,
	pub description: Option<String>,
	pub creator: Option<String>,
	pub created_after: Option<u64>,
	pub created_before: Option<u64>,
}

/// Holds every debate and the node→debates index used to answer
/// "which debates is this opinion a member of" without scanning.
#[derive(Debug)]
pub struct DebateStore {
	debates: HashMap<DebateUid, Debate>,
	global: DebateUid,
}

impl DebateStore {
	/// Creates the store with its global debate already materialised,
	/// per the lifecycle note in `spec.md` §9: the global debate's UID
	/// is cached here rather than looked up by name each time.
	pub fn new() -> Self {
		let global = DebateUid::new();
		let mut debates = HashMap::new();
		debates.insert(
			global,
			Debate {
				uid: global,
				name: "global".to_string(),
				description: None,
				creator: "system".to_string(),
				is_all: true,
				created_at: 0,
				members: HashSet::new(),
			},
		);
		DebateStore { debates, global }
	}

	pub fn global_debate(&self) -> DebateUid {
		self.global
	}

	pub fn create_debate(&mut self, name: String, creator: String, description: Option<String>, created_at: u64) -> DebateUid {
		let uid = DebateUid::new();
		self.debates.insert(
			uid,
			Debate {
				uid,
				name,
				description,
				creator,
				is_all: false,
				created_at,
				members: HashSet::new(),
			},
		);
		uid
	}

	pub fn delete_debate(&mut self, uid: DebateUid) -> Result<()> {
		if uid == self.global {
			return Err(Error::CannotDeleteGlobalDebate);
		}
		self.debates.remove(&uid).ok_or(Error::DebateNotFound(uid))?;
		Ok(())
	}

	pub fn debate(&self, uid: DebateUid) -> Result<&Debate> {
		self.debates.get(&uid).ok_or(Error::DebateNotFound(uid))
	}

	pub fn patch_debate(
		&mut self,
		uid: DebateUid,
		name: Option<String>,
		description: Option<String>,
		creator: Option<String>,
	) -> Result<()> {
		let debate = self.debates.get_mut(&uid).ok_or(Error::DebateNotFound(uid))?;
		if let Some(name) = name {
			debate.name = name;
		}
		if let Some(description) = description {
			debate.description = Some(description);
		}
		if let Some(creator) = creator {
			debate.creator = creator;
		}
		Ok(())
	}

	/// Substring/range filter over every debate (`original_source`'s
	/// `query_debate`); an exact `uid` match short-circuits the rest.
	pub fn query(&self, query: &DebateQuery) -> Vec<Debate> {
		if let Some(uid) = query.uid {
			return self.debates.get(&uid).cloned().into_iter().collect();
		}
		self.debates
			.values()
			.filter(|d| {
				query
					.name
					.as_ref()
					.map(|s| d.name.to_ascii_lowercase().contains(&s.to_ascii_lowercase()))
					.unwrap_or(true)
			})
			.filter(|d| {
				query
					.description
					.as_ref()
					.map(|s| {
						d.description
							.as_ref()
							.map(|desc| desc.to_ascii_lowercase().contains(&s.to_ascii_lowercase()))
							.unwrap_or(false)
					})
					.unwrap_or(true)
			})
			.filter(|d| {
				query
					.creator
					.as_ref()
					.map(|s| d.creator.to_ascii_lowercase().contains(&s.to_ascii_lowercase()))
					.unwrap_or(true)
			})
			.filter(|d| query.created_after.map(|t| d.created_at >= t).unwrap_or(true))
			.filter(|d| query.created_before.map(|t| d.created_at <= t).unwrap_or(true))
			.cloned()
			.collect()
	}

	/// Adds `opinion` to `debate` and, unless `debate` already is the
	/// global debate, to the global debate too (`spec.md` §3 invariant 8).
	pub fn add_member(&mut self, debate: DebateUid, opinion: Uid) -> Result<()> {
		if !self.debates.contains_key(&debate) {
			return Err(Error::DebateNotFound(debate));
		}
		self.debates.get_mut(&debate).unwrap().members.insert(opinion);
		if debate != self.global {
			self.debates.get_mut(&self.global).unwrap().members.insert(opinion);
		}
		Ok(())
	}

	/// Retracts membership only, without touching the global debate.
	/// Full removal from the global debate is the opinion engine's job
	/// (it also removes the node itself).
	pub fn remove_member(&mut self, debate: DebateUid, opinion: Uid) -> Result<()> {
		let d = self.debates.get_mut(&debate).ok_or(Error::DebateNotFound(debate))?;
		d.members.remove(&opinion);
		Ok(())
	}

	/// Removes `opinion` from every debate, global included — used when
	/// the node itself is deleted.
	pub fn remove_everywhere(&mut self, opinion: Uid) {
		for debate in self.debates.values_mut() {
			debate.members.remove(&opinion);
		}
	}

	pub fn is_member(&self, debate: DebateUid, opinion: Uid) -> bool {
		self.debates
			.get(&debate)
			.map(|d| d.members.contains(&opinion))
			.unwrap_or(false)
	}

	pub fn cite(&mut self, debate: DebateUid, opinion: Uid) -> Result<bool> {
		if !self.debates.contains_key(&debate) {
			return Err(Error::DebateNotFound(debate));
		}
		if self.is_member(debate, opinion) {
			return Ok(false);
		}
		self.add_member(debate, opinion)?;
		Ok(true)
	}
}

impl Default for DebateStore {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn global_debate_cannot_be_deleted() {
		let mut store = DebateStore::new();
		let global = store.global_debate();
		assert_eq!(store.delete_debate(global), Err(Error::CannotDeleteGlobalDebate));
	}

	#[test]
	fn membership_in_named_debate_implies_global_membership() {
		let mut store = DebateStore::new();
		let debate = store.create_debate("climate".to_string(), "alice".to_string(), None, 0);
		let opinion = Uid::new();
		store.add_member(debate, opinion).unwrap();

		assert!(store.is_member(debate, opinion));
		assert!(store.is_member(store.global_debate(), opinion));
	}

	#[test]
	fn cite_is_idempotent() {
		let mut store = DebateStore::new();
		let debate = store.create_debate("climate".to_string(), "alice".to_string(), None, 0);
		let opinion = Uid::new();
		assert!(store.cite(debate, opinion).unwrap());
		assert!(!store.cite(debate, opinion).unwrap());
	}
}
