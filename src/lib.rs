// SPDX-License-Identifier: Apache-2.0

//! An argument-graph scoring engine: a directed acyclic graph of
//! propositions ("opinions") connected by typed edges ("supports" /
//! "opposes"), where every node carries up to four real-valued scores
//! in `[0, 1]` kept consistent with a declarative algebra over the
//! graph. Callers mutate the graph through [`Engine`]; the engine
//! propagates consequences so that, for every node, the displayed
//! scores are a function of the graph and of the leaf-supplied
//! evidence.
//!
//! # Glossary
//!
//! - **Opinion.** A node in the argument graph; carries truth-valued
//!   scores if OR and leaf, otherwise derives them.
//! - **OR node.** A proposition whose positive support is the max of
//!   its supporters (disjunction of evidence).
//! - **AND node.** An operand-grouping node whose positive support is
//!   the min of its supporters (conjunction).
//! - **SUPPORT / OPPOSE edge.** Typed directed edge from
//!   supporter/attacker to target.
//! - **Leaf.** A node with no incoming edges; the only kind that
//!   accepts an externally supplied `positive_score`.
//! - **Root.** A node with no outgoing edges.
//! - **Child aggregate.** Per-node per-direction rolled-up score from
//!   incoming edges; distinguished from the displayed
//!   `positive_score`/`negative_score`, which combine both directions.
//! - **Attack link.** The operation that materialises an edge as a
//!   contestable proposition by inserting an OR+AND pair.
//! - **Global debate.** The distinguished debate whose membership is
//!   the union of all others.

pub mod arithmetic;
pub mod config;
pub mod debate_engine;
pub mod engine;
pub mod error;
pub mod link_engine;
pub mod logging;
pub mod model;
pub mod opinion_engine;
pub mod propagate;
pub mod store;
pub mod uid;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use model::{LinkType, LogicType, NodeType, Opinion};
pub use uid::{DebateUid, LinkUid, Uid};
