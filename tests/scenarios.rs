// SPDX-License-Identifier: Apache-2.0

//! The six literal scenarios of `spec.md` §8, plus the round-trip and
//! cycle-rejection properties listed alongside them.

use agora::{Engine, EngineConfig, LinkType::{Oppose, Support}};
use test_log::test;

fn engine() -> Engine {
	Engine::new(EngineConfig::default())
}

fn leaf(engine: &Engine, debate: agora::DebateUid, content: &str, score: f64) -> agora::Uid {
	engine
		.create_or_opinion(content.to_string(), "alice".to_string(), debate, Some(score))
		.unwrap()
}

#[test]
fn scenario_1_or_support_aggregation() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let a = leaf(&engine, debate, "A", 0.5);
	let b = leaf(&engine, debate, "B", 0.6);

	engine.create_link(a, r, Support).unwrap();
	engine.create_link(b, r, Support).unwrap();

	let r = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(r.child_positive, Some(0.6));
	assert_eq!(r.positive_score, Some(0.6));
}

#[test]
fn scenario_2_or_oppose_aggregation() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let a = leaf(&engine, debate, "A", 0.5);
	let b = leaf(&engine, debate, "B", 0.6);
	let c = leaf(&engine, debate, "C", 0.4);
	let d = leaf(&engine, debate, "D", 0.6);

	engine.create_link(a, r, Support).unwrap();
	engine.create_link(b, r, Support).unwrap();
	engine.create_link(c, r, Oppose).unwrap();
	engine.create_link(d, r, Oppose).unwrap();

	let r = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(r.child_negative, Some(0.6));
	let positive = r.positive_score.unwrap();
	assert!((positive - 0.5).abs() < 1e-9, "expected 0.5, got {positive}");
}

#[test]
fn scenario_3_and_min_rule() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let p1 = leaf(&engine, debate, "P1", 0.5);
	let p2 = leaf(&engine, debate, "P2", 0.6);

	let (and_id, edge_ids, _updated) = engine
		.create_and_opinion(r, vec![p1, p2], Support, "alice".to_string(), debate)
		.unwrap();
	assert_eq!(edge_ids.len(), 3); // parent edge + 2 son edges

	let and_node = engine.info_opinion(and_id, false).unwrap().opinion;
	assert_eq!(and_node.child_positive, Some(0.5));
	assert_eq!(and_node.positive_score, Some(0.5));

	let r = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(r.child_positive, Some(0.5));
}

#[test]
fn scenario_4_and_oppose_with_retract() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let p1 = leaf(&engine, debate, "P1", 0.5);
	let p2 = leaf(&engine, debate, "P2", 0.6);
	engine.create_and_opinion(r, vec![p1, p2], Support, "alice".to_string(), debate).unwrap();

	let q1 = leaf(&engine, debate, "Q1", 0.7);
	let q2 = leaf(&engine, debate, "Q2", 0.8);
	let (and2_id, _, _) = engine
		.create_and_opinion(r, vec![q1, q2], Oppose, "alice".to_string(), debate)
		.unwrap();

	let and2 = engine.info_opinion(and2_id, false).unwrap().opinion;
	assert_eq!(and2.positive_score, Some(0.7));
	let r_after_and2 = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(r_after_and2.child_negative, Some(0.7));

	engine.patch_opinion(q1, None, Some(None)).unwrap();

	let and2 = engine.info_opinion(and2_id, false).unwrap().opinion;
	assert_eq!(and2.child_positive, Some(0.8));

	let r = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(r.child_negative, Some(0.8));
}

#[test]
fn scenario_5_cycle_rejection() {
	let engine = engine();
	let debate = engine.global_debate();
	let a = leaf(&engine, debate, "A", 0.1);
	let b = leaf(&engine, debate, "B", 0.1);
	let c = leaf(&engine, debate, "C", 0.1);

	engine.create_link(a, b, Support).unwrap();
	engine.create_link(b, c, Support).unwrap();

	let err = engine.create_link(c, a, Support).unwrap_err();
	assert!(matches!(err, agora::Error::Cycle { .. }));

	// The rejected link must not have been written.
	let c_info = engine.info_opinion(c, true).unwrap();
	assert!(!c_info.edges.unwrap().supports.contains(&a));
}

#[test]
fn scenario_6_attack_link_materialisation() {
	let engine = engine();
	let debate = engine.global_debate();
	let y = engine.create_or_opinion("Y".to_string(), "alice".to_string(), debate, None).unwrap();
	let x = leaf(&engine, debate, "X", 0.4);
	let (link, _) = engine.create_link(x, y, Support).unwrap();

	let y_before = engine.info_opinion(y, false).unwrap().opinion;

	let (r_id, and_id) = engine.attack_link(link, debate).unwrap();

	let r = engine.info_opinion(r_id, false).unwrap().opinion;
	assert_eq!(r.positive_score, Some(1.0));

	let and_node = engine.info_opinion(and_id, false).unwrap().opinion;
	assert_eq!(and_node.positive_score, Some(0.4));

	let y_after = engine.info_opinion(y, false).unwrap().opinion;
	assert_eq!(y_after.positive_score, y_before.positive_score);
	assert_eq!(y_after.child_positive, y_before.child_positive);
}

#[test]
fn create_link_then_delete_link_restores_prior_scores() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let a = leaf(&engine, debate, "A", 0.5);
	let b = leaf(&engine, debate, "B", 0.3);

	engine.create_link(a, r, Support).unwrap();
	let before = engine.info_opinion(r, false).unwrap().opinion;

	let (link, _) = engine.create_link(b, r, Support).unwrap();
	engine.delete_link(link).unwrap();

	let after = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(before.positive_score, after.positive_score);
	assert_eq!(before.child_positive, after.child_positive);
}

#[test]
fn patching_leaf_away_and_back_restores_score() {
	let engine = engine();
	let debate = engine.global_debate();
	let r = engine.create_or_opinion("R".to_string(), "alice".to_string(), debate, None).unwrap();
	let a = leaf(&engine, debate, "A", 0.5);
	engine.create_link(a, r, Support).unwrap();

	let before = engine.info_opinion(r, false).unwrap().opinion;

	engine.patch_opinion(a, None, Some(Some(0.9))).unwrap();
	engine.patch_opinion(a, None, Some(None)).unwrap();
	engine.patch_opinion(a, None, Some(Some(0.5))).unwrap();

	let after = engine.info_opinion(r, false).unwrap().opinion;
	assert_eq!(before.positive_score, after.positive_score);
}

#[test]
fn no_sequence_of_operations_introduces_a_cycle() {
	let engine = engine();
	let debate = engine.global_debate();
	let a = leaf(&engine, debate, "A", 0.1);
	let b = leaf(&engine, debate, "B", 0.1);

	let (link, _) = engine.create_link(a, b, Support).unwrap();
	engine.delete_link(link).unwrap();
	engine.create_link(a, b, Support).unwrap();

	assert!(engine.create_link(b, a, Support).is_err());
}
