// SPDX-License-Identifier: Apache-2.0

//! Engine-level configuration.
//!
//! Connection strings, CORS origins, and the LLM endpoint are the
//! host program's concern (`spec.md` §6); this module only covers the
//! knobs the scoring engine itself reads.

use std::path::Path;

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::{Error, Result};

/// Configuration of the scoring engine's internal behavior.
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
	/// Reject links that would push the graph's depth past this bound (`spec.md` §5).
	#[default = 256]
	pub max_link_depth: usize,

	/// Tolerance below which two scores are considered equal (`spec.md` §8).
	#[default(1e-6)]
	pub score_epsilon: f64,

	/// Creator names that may not be used to create or patch an opinion.
	#[default(_code = "vec![\"system\".to_string(), \"root\".to_string()]")]
	pub reserved_creator_names: Vec<String>,
}

impl EngineConfig {
	/// Load configuration from a TOML file, falling back to defaults if `path` doesn't exist.
	pub fn load_from(path: &Path) -> Result<EngineConfig> {
		if !path.exists() {
			return Ok(EngineConfig::default());
		}

		let contents = std::fs::read_to_string(path)
			.map_err(|e| Error::MetadataStore(format!("reading config file: {e}")))?;

		toml::from_str(&contents)
			.map_err(|e| Error::MetadataStore(format!("parsing config file: {e}")))
	}

	pub fn is_reserved_creator(&self, creator: &str) -> bool {
		self.reserved_creator_names
			.iter()
			.any(|name| name == creator)
	}
}
