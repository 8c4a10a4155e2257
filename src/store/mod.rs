// SPDX-License-Identifier: Apache-2.0

//! The two logical stores `spec.md` §6 and §9 describe: a graph store
//! (topology + node/edge attributes) and a metadata store (debate
//! membership). Kept as separate modules so either could be swapped
//! for a real database without touching the propagator.

pub mod debate_store;
pub mod graph_store;

pub use debate_store::DebateStore;
pub use graph_store::GraphStore;
