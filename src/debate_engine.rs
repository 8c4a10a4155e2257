// SPDX-License-Identifier: Apache-2.0

//! The debate engine (`SPEC_FULL.md` §4.4). Debates are out of the
//! distilled spec's core scoring algebra but every opinion operation
//! takes a `debate_id`, so their lifecycle has to live somewhere — the
//! metadata store's natural owner.

use crate::error::Result;
use crate::opinion_engine::now_millis;
use crate::store::debate_store::{Debate, DebateQuery};
use crate::store::DebateStore;
use crate::uid::{DebateUid, Uid};

pub fn create_debate(debates: &mut DebateStore, name: String, creator: String, description: Option<String>) -> DebateUid {
	debates.create_debate(name, creator, description, now_millis())
}

pub fn delete_debate(debates: &mut DebateStore, debate_id: DebateUid) -> Result<()> {
	debates.delete_debate(debate_id)
}

pub fn info_debate(debates: &DebateStore, debate_id: DebateUid) -> Result<Debate> {
	debates.debate(debate_id).map(|d| d.clone())
}

pub fn query_debate(debates: &DebateStore, query: DebateQuery) -> Vec<Debate> {
	debates.query(&query)
}

pub fn patch_debate(
	debates: &mut DebateStore,
	debate_id: DebateUid,
	name: Option<String>,
	description: Option<String>,
	creator: Option<String>,
) -> Result<()> {
	debates.patch_debate(debate_id, name, description, creator)
}

/// `cite_in_debate`: adds an existing opinion to a debate it is not
/// yet a member of. Idempotent — citing twice is a no-op, not an error
/// (`SPEC_FULL.md` §4.4 decides this in favor of idempotency over the
/// original's raised exception; see `DESIGN.md`).
pub fn cite_in_debate(debates: &mut DebateStore, debate_id: DebateUid, opinion_id: Uid) -> Result<bool> {
	debates.cite(debate_id, opinion_id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	#[test]
	fn create_then_patch_then_query_roundtrip() {
		let mut debates = DebateStore::new();
		let id = create_debate(&mut debates, "climate".to_string(), "alice".to_string(), None);

		patch_debate(&mut debates, id, None, Some("policy debate".to_string()), None).unwrap();
		let info = info_debate(&debates, id).unwrap();
		assert_eq!(info.name, "climate");
		assert_eq!(info.description.as_deref(), Some("policy debate"));

		let found = query_debate(&debates, DebateQuery { name: Some("clim".to_string()), ..Default::default() });
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].uid, id);
	}

	#[test]
	fn delete_debate_rejects_global() {
		let mut debates = DebateStore::new();
		let global = debates.global_debate();
		assert_eq!(delete_debate(&mut debates, global).unwrap_err(), Error::CannotDeleteGlobalDebate);
	}

	#[test]
	fn cite_in_debate_is_idempotent() {
		let mut debates = DebateStore::new();
		let id = create_debate(&mut debates, "climate".to_string(), "alice".to_string(), None);
		let opinion = Uid::new();
		assert!(cite_in_debate(&mut debates, id, opinion).unwrap());
		assert!(!cite_in_debate(&mut debates, id, opinion).unwrap());
	}
}
