// SPDX-License-Identifier: Apache-2.0

//! The tagged error type every engine operation returns.
//!
//! Mirrors the five error kinds of the scoring engine's design: a
//! caller can match on the kind without parsing a message string, the
//! way an HTTP layer needs to in order to pick a status code.

use crate::uid::{DebateUid, LinkUid, Uid};

/// `Result` which uses [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum Error {
	// --- Validation ---
	#[error("self-loop rejected: {0} cannot link to itself")]
	SelfLoop(Uid),

	#[error("link from {from} to {to} would create a cycle")]
	Cycle { from: Uid, to: Uid },

	#[error("link target {0} is an AND node; AND nodes are wired only by the opinion engine")]
	AndNodeLinkTarget(Uid),

	#[error("operation requires a leaf node, but {0} has incoming edges")]
	NotALeaf(Uid),

	#[error("unknown edge type '{0}'")]
	UnknownEdgeType(String),

	#[error("score {0} is out of range [0, 1]")]
	ScoreOutOfRange(f64),

	#[error("OR node content must not be empty")]
	EmptyOrContent,

	#[error("creator name '{0}' is reserved")]
	ReservedCreatorName(String),

	#[error("AND group requires at least one son")]
	EmptyAndGroup,

	#[error("AND groups may only be created under OR parents; {0} is an AND node")]
	AndUnderAnd(Uid),

	#[error("node {0} is not solid; AND groups require solid operands")]
	NotSolid(Uid),

	#[error("link would exceed the maximum depth of {max}")]
	DepthExceeded { max: usize },

	// --- NotFound ---
	#[error("no opinion with id {0}")]
	OpinionNotFound(Uid),

	#[error("no link with id {0}")]
	LinkNotFound(LinkUid),

	#[error("no debate with id {0}")]
	DebateNotFound(DebateUid),

	// --- Conflict ---
	#[error("cannot delete the global debate")]
	CannotDeleteGlobalDebate,

	// --- Storage ---
	#[error("graph store error: {0}")]
	GraphStore(String),

	#[error("metadata store error: {0}")]
	MetadataStore(String),

	// --- Propagation ---
	#[error("propagation invariant breach at {node}: {detail}")]
	Propagation { node: Uid, detail: String },
}

impl Error {
	/// True for errors that are recoverable at the API boundary (4xx-style).
	pub fn is_client_error(&self) -> bool {
		!matches!(
			self,
			Error::GraphStore(_) | Error::MetadataStore(_) | Error::Propagation { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_and_propagation_are_not_client_errors() {
		assert!(!Error::GraphStore("boom".into()).is_client_error());
		assert!(!Error::Propagation {
			node: Uid::new(),
			detail: "bad".into()
		}
		.is_client_error());
	}

	#[test]
	fn validation_and_not_found_are_client_errors() {
		assert!(Error::EmptyOrContent.is_client_error());
		assert!(Error::OpinionNotFound(Uid::new()).is_client_error());
	}
}
