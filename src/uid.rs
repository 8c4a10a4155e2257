// SPDX-License-Identifier: Apache-2.0

//! Opaque identifiers for opinions, links, and debates.
//!
//! UIDs carry no semantic content; they're derived from a monotonic
//! counter and a process-local random nonce, hashed with `blake3` so
//! that two engines in the same process never collide even if their
//! counters happen to line up.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;
use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_uid(prefix: &str) -> String {
	let count = COUNTER.fetch_add(1, Ordering::Relaxed);
	let mut nonce = [0u8; 8];
	rand::rng().fill_bytes(&mut nonce);

	let mut hasher = blake3::Hasher::new();
	hasher.update(prefix.as_bytes());
	hasher.update(&count.to_le_bytes());
	hasher.update(&nonce);
	let hash = hasher.finalize();

	hash.to_hex()[..16].to_string()
}

macro_rules! uid_type {
	($name:ident, $prefix:literal) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		pub struct $name(
			#[serde(with = "uid_bytes")]
			[u8; 16],
		);

		impl $name {
			pub fn new() -> Self {
				let hex = next_uid($prefix);
				$name(Self::parse_hex(&hex))
			}

			fn parse_hex(hex: &str) -> [u8; 16] {
				let mut out = [0u8; 16];
				for (i, byte) in out.iter_mut().enumerate() {
					*byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap_or(0);
				}
				out
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}:", $prefix)?;
				for byte in self.0 {
					write!(f, "{:02x}", byte)?;
				}
				Ok(())
			}
		}
	};
}

mod uid_bytes {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &[u8; 16], s: S) -> Result<S::Ok, S::Error> {
		let mut hex = String::with_capacity(32);
		for byte in bytes {
			hex.push_str(&format!("{:02x}", byte));
		}
		s.serialize_str(&hex)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 16], D::Error> {
		let hex = String::deserialize(d)?;
		let mut out = [0u8; 16];
		for (i, byte) in out.iter_mut().enumerate() {
			*byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
				.map_err(serde::de::Error::custom)?;
		}
		Ok(out)
	}
}

uid_type!(Uid, "op");
uid_type!(LinkUid, "lk");
uid_type!(DebateUid, "db");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uids_are_unique() {
		let a = Uid::new();
		let b = Uid::new();
		assert_ne!(a, b);
	}

	#[test]
	fn uid_types_do_not_collide_in_display() {
		let op = Uid::new();
		let lk = LinkUid::new();
		assert!(op.to_string().starts_with("op:"));
		assert!(lk.to_string().starts_with("lk:"));
	}
}
