// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for host binaries.
//!
//! The engine library itself only ever calls the `log` macros; it
//! never installs a logger. This module is what a host binary (our
//! own `src/bin/agora.rs`, or an HTTP layer embedding this crate)
//! calls once at startup.

use env_logger::Env;

/// Install an `env_logger` backend reading the `AGORA_LOG` variable
/// for its filter directives (analogous to the teacher's `HC_LOG`).
pub fn init_logging() -> std::result::Result<(), log::SetLoggerError> {
	let env = Env::new().filter("AGORA_LOG").write_style("AGORA_LOG_STYLE");
	env_logger::Builder::from_env(env).try_init()
}
