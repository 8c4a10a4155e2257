// SPDX-License-Identifier: Apache-2.0

//! A minimal demo CLI over the scoring engine. The HTTP surface, auth,
//! and LLM graph builder are out of scope for the core (`spec.md` §1);
//! this binary exists only to exercise the engine end to end without
//! embedding it in a host program. Since nothing persists the graph
//! between invocations, each run builds and scores one of the literal
//! scenarios from `spec.md` §8 and prints the resulting scores.

use std::path::PathBuf;
use std::process::ExitCode;

use agora::{Engine, EngineConfig};
use clap::{Parser, ValueEnum};
use log::error;

/// Build and score one of the reference argument-graph scenarios.
#[derive(Debug, Parser)]
#[command(about, long_about = None)]
struct Args {
	/// path to an agora.toml configuration file
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// which scenario to run
	#[arg(value_enum, default_value = "or-support")]
	scenario: Scenario,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
	/// OR node aggregates two supporters by max (spec.md §8 scenario 1)
	OrSupport,
	/// OR node aggregates support and oppose (spec.md §8 scenario 2)
	OrOppose,
	/// AND node aggregates its operands by min (spec.md §8 scenario 3)
	AndMin,
	/// AND-oppose group with a retracted operand (spec.md §8 scenario 4)
	AndRetract,
}

fn main() -> ExitCode {
	if let Err(e) = agora::logging::init_logging() {
		eprintln!("warning: logging already initialized: {e}");
	}

	let args = Args::parse();
	let config = match &args.config {
		Some(path) => EngineConfig::load_from(path),
		None => Ok(EngineConfig::default()),
	};
	let config = match config {
		Ok(c) => c,
		Err(e) => {
			error!("failed to load configuration: {e}");
			return ExitCode::FAILURE;
		}
	};

	let engine = Engine::new(config);
	if let Err(e) = run_scenario(&engine, args.scenario) {
		error!("{e}");
		return ExitCode::FAILURE;
	}
	ExitCode::SUCCESS
}

fn run_scenario(engine: &Engine, scenario: Scenario) -> agora::Result<()> {
	use agora::LinkType::{Oppose, Support};

	let debate = engine.global_debate();
	let leaf = |engine: &Engine, content: &str, score: f64| {
		engine.create_or_opinion(content.to_string(), "cli".to_string(), debate, Some(score))
	};

	match scenario {
		Scenario::OrSupport => {
			let r = engine.create_or_opinion("R".to_string(), "cli".to_string(), debate, None)?;
			let a = leaf(engine, "A", 0.5)?;
			let b = leaf(engine, "B", 0.6)?;
			engine.create_link(a, r, Support)?;
			engine.create_link(b, r, Support)?;
			report(engine, r)
		}
		Scenario::OrOppose => {
			let r = engine.create_or_opinion("R".to_string(), "cli".to_string(), debate, None)?;
			let a = leaf(engine, "A", 0.5)?;
			let b = leaf(engine, "B", 0.6)?;
			let c = leaf(engine, "C", 0.4)?;
			let d = leaf(engine, "D", 0.6)?;
			engine.create_link(a, r, Support)?;
			engine.create_link(b, r, Support)?;
			engine.create_link(c, r, Oppose)?;
			engine.create_link(d, r, Oppose)?;
			report(engine, r)
		}
		Scenario::AndMin => {
			let r = engine.create_or_opinion("R".to_string(), "cli".to_string(), debate, None)?;
			let p1 = leaf(engine, "P1", 0.5)?;
			let p2 = leaf(engine, "P2", 0.6)?;
			let (and_id, ..) = engine.create_and_opinion(r, vec![p1, p2], Support, "cli".to_string(), debate)?;
			report(engine, and_id)?;
			report(engine, r)
		}
		Scenario::AndRetract => {
			let r = engine.create_or_opinion("R".to_string(), "cli".to_string(), debate, None)?;
			let p1 = leaf(engine, "P1", 0.5)?;
			let p2 = leaf(engine, "P2", 0.6)?;
			engine.create_and_opinion(r, vec![p1, p2], Support, "cli".to_string(), debate)?;
			let q1 = leaf(engine, "Q1", 0.7)?;
			let q2 = leaf(engine, "Q2", 0.8)?;
			let (and2_id, ..) = engine.create_and_opinion(r, vec![q1, q2], Oppose, "cli".to_string(), debate)?;
			report(engine, and2_id)?;
			report(engine, r)?;
			engine.patch_opinion(q1, None, Some(None))?;
			println!("-- after retracting Q1 --");
			report(engine, and2_id)?;
			report(engine, r)
		}
	}
}

fn report(engine: &Engine, id: agora::Uid) -> agora::Result<()> {
	let info = engine.info_opinion(id, false)?;
	let o = info.opinion;
	println!(
		"{} ({}): positive={:?} negative={:?} child_positive={:?} child_negative={:?}",
		o.content, id, o.positive_score, o.negative_score, o.child_positive, o.child_negative
	);
	Ok(())
}
