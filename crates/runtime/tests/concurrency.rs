//! Producer/consumer interplay across threads: single responder, guarded
//! waits, and drain termination.
mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use bridge_runtime::BridgeError;
use decision_core::{ChoiceInput, Decision, DecisionKind, ObjectId, PlayableObject};

use common::{context, table};

#[test]
fn test_single_responder_under_racing_callers() {
    const CALLERS: usize = 8;

    for _ in 0..25 {
        let (ctx, recorder) = context();
        let id = ctx.store_decision(Decision::Select, "priority").unwrap();
        let barrier = Arc::new(Barrier::new(CALLERS));

        let workers: Vec<_> = (0..CALLERS)
            .map(|n| {
                let ctx = ctx.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if n % 2 == 0 {
                        ctx.take_default().map(|_| ())
                    } else {
                        ctx.choose(&ChoiceInput::answer(false).for_decision(id))
                            .map(|_| ())
                    }
                })
            })
            .collect();

        let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for err in results.into_iter().filter_map(|r| r.err()) {
            assert!(matches!(
                err,
                BridgeError::NoPendingAction | BridgeError::StaleDecision { .. }
            ));
        }
        assert_eq!(recorder.answer_count(), 1);
    }
}

#[test]
fn test_wait_for_next_wakes_on_decision() {
    let (ctx, _) = context();
    let waiter = {
        let ctx = ctx.clone();
        thread::spawn(move || ctx.wait_for_next(Duration::from_secs(10)))
    };

    thread::sleep(Duration::from_millis(30));
    let id = ctx.store_decision(Decision::Ask, "Keep hand?").unwrap();

    let report = waiter.join().unwrap().unwrap();
    assert!(report.action_pending);
    assert!(!report.timed_out);
    assert_eq!(report.pending.map(|p| p.decision_id), Some(id));
}

#[test]
fn test_wait_for_next_times_out() {
    let (ctx, _) = context();
    let report = ctx.wait_for_next(Duration::from_millis(20)).unwrap();
    assert!(report.timed_out);
    assert!(!report.action_pending);
}

#[test]
fn test_pass_priority_skips_until_other_decision() {
    let (ctx, recorder) = context();
    ctx.store_decision(Decision::Select, "priority").unwrap();

    let passer = {
        let ctx = ctx.clone();
        thread::spawn(move || ctx.pass_priority(Duration::from_secs(10)))
    };

    let deadline = Instant::now() + Duration::from_secs(5);
    while recorder.answer_count() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    ctx.store_decision(Decision::GetAmount { min: 0, max: 3 }, "How many?")
        .unwrap();

    let report = passer.join().unwrap().unwrap();
    assert!(report.action_pending);
    assert_eq!(report.actions_passed, 1);
    assert_eq!(
        report.pending.map(|p| p.action_type),
        Some(DecisionKind::GetAmount)
    );
}

#[test]
fn test_pass_priority_stops_at_playable_card() {
    let mut table = table(20, 20);
    let bolt = ObjectId::random();
    table
        .snapshot
        .playable
        .push(PlayableObject::new(bolt, ["Cast Lightning Bolt"]));
    let (ctx, recorder) = context();
    ctx.update_snapshot(table.snapshot).unwrap();
    ctx.store_decision(Decision::Select, "priority").unwrap();

    let report = ctx.pass_priority(Duration::from_secs(1)).unwrap();
    assert!(report.has_playable_cards);
    assert_eq!(report.actions_passed, 0);
    assert_eq!(recorder.answer_count(), 0);
}

#[test]
fn test_drain_with_zero_timeout_returns_summary() {
    let (ctx, _) = context();
    ctx.update_snapshot(table(20, 18).snapshot).unwrap();
    ctx.store_decision(Decision::Select, "priority").unwrap();

    let started = Instant::now();
    let report = ctx.drain_until_event(50, Duration::ZERO).unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(report.timed_out);
    assert_eq!(report.actions_taken, 0);
    assert!(report.new_log.contains("Turn 4, PRECOMBAT_MAIN - PRECOMBAT_MAIN, Alice's turn"));
    assert!(report.new_log.contains("Bob: 18 life, 0 permanents"));
    assert!(ctx.pending().unwrap().is_some());
}

#[test]
fn test_drain_on_quiet_table_times_out_with_summary() {
    let (ctx, recorder) = context();
    ctx.update_snapshot(table(20, 18).snapshot).unwrap();
    ctx.store_decision(Decision::Select, "priority").unwrap();

    let report = ctx.drain_until_event(50, Duration::from_millis(50)).unwrap();
    assert!(report.timed_out);
    assert_eq!(report.actions_taken, 1);
    assert_eq!(recorder.answer_count(), 1);
    assert!(report.new_log.contains("Bob: 18 life, 0 permanents"));
    assert!(ctx.pending().unwrap().is_none());
}

#[test]
fn test_drain_reports_life_loss() {
    let (ctx, _) = context();
    let before = table(20, 20);
    ctx.update_snapshot(before.snapshot.clone()).unwrap();

    let producer = {
        let ctx = ctx.clone();
        let mut after = before.snapshot.clone();
        after.players[1].life = 17;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            ctx.update_snapshot(after).unwrap();
        })
    };

    let report = ctx
        .drain_until_event(10_000, Duration::from_secs(30))
        .unwrap();
    producer.join().unwrap();
    assert!(report.event_occurred);
    assert!(!report.timed_out);
    assert!(report.new_log.contains("Bob: 20 -> 17 life (-3)"));
}

#[test]
fn test_drain_returns_on_log_growth() {
    let (ctx, _) = context();
    ctx.append_log(&"a".repeat(120)).unwrap();
    assert_eq!(ctx.log().len(), 120);

    let producer = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            // the separator counts as one of the sixty new characters
            ctx.append_log(&"b".repeat(59)).unwrap();
        })
    };

    let started = Instant::now();
    let report = ctx.drain_until_event(50, Duration::from_secs(5)).unwrap();
    producer.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.event_occurred);
    assert!(!report.timed_out);
    assert_eq!(report.new_chars, 60);
}

#[test]
fn test_drain_stops_at_manual_choice() {
    let mut table = table(20, 20);
    table.snapshot.players[0].mana_pool.red = 1;
    table.snapshot.players[0].mana_pool.green = 1;
    let (ctx, recorder) = context();
    ctx.update_snapshot(table.snapshot).unwrap();
    ctx.store_decision(Decision::Select, "priority").unwrap();

    let producer = {
        let ctx = ctx.clone();
        let recorder = recorder.clone();
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(5);
            while recorder.answer_count() == 0 && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            ctx.store_decision(Decision::PlayMana, "Pay mana").unwrap();
        })
    };

    let report = ctx.drain_until_event(10_000, Duration::from_secs(10)).unwrap();
    producer.join().unwrap();
    assert_eq!(report.actions_taken, 1);
    let manual = report.needs_manual_choice.unwrap();
    assert_eq!(manual.action_type, DecisionKind::PlayMana);
    assert!(ctx.pending().unwrap().is_some());
}

#[test]
fn test_game_over_wakes_waiters() {
    let (ctx, _) = context();
    let waiter = {
        let ctx = ctx.clone();
        thread::spawn(move || ctx.wait_for_next(Duration::from_secs(10)))
    };
    thread::sleep(Duration::from_millis(30));
    ctx.finish("Alice wins").unwrap();

    let report = waiter.join().unwrap().unwrap();
    assert!(report.game_over);
    assert!(!report.timed_out);
}
