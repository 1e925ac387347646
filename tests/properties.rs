// Invariant checks over generated charts and input scripts.

use fansa_band::scheduler::NoteScheduler;
use fansa_band::{
    Call, CallCatalog, Chart, FeedbackKind, Gesture, GestureOutcome, Instrument, JudgeWindows, Note, Session,
    SessionConfig, SessionEvent, TickOutcome,
};
use proptest::prelude::*;

fn chart_strategy(max_len: usize) -> impl Strategy<Value = Chart> {
    prop::collection::vec((40u32..640, prop::bool::weighted(0.2), 0u8..4), 1..max_len).prop_map(|specs| {
        let mut t = 500.0;
        let notes = specs
            .into_iter()
            .map(|(gap, special, lane)| {
                t += gap as f64;
                let note = if special { Note::special(t) } else { Note::normal(t) };
                note.in_lane(lane)
            })
            .collect();
        Chart::new(notes)
    })
}

fn gesture_strategy() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        2 => (0u32..400).prop_map(|x| Gesture::tap(x as f64, 600.0)),
        1 => (0u32..200).prop_map(|dy| Gesture::swipe((100.0, 500.0), (100.0, 500.0 - dy as f64))),
    ]
}

/// Frame steps in ms, each optionally followed by a gesture.
fn script_strategy(max_len: usize) -> impl Strategy<Value = Vec<(u32, Option<Gesture>)>> {
    prop::collection::vec((1u32..34, prop::option::weighted(0.25, gesture_strategy())), 0..max_len)
}

fn last_note(chart: &Chart) -> f64 {
    chart.notes().last().map_or(0.0, |n| n.time)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Every note reaches a judgment exactly once under monotonically rising time.
    #[test]
    fn every_note_resolves_exactly_once(chart in chart_strategy(40), script in script_strategy(2000)) {
        let mut session = Session::new(&chart, SessionConfig::default(), Instrument::Guitar, CallCatalog::default());
        let mut seen = vec![None; chart.len()];
        let mut now = 0.0;
        let mut check = |session: &Session| -> Result<(), TestCaseError> {
            for state in session.notes() {
                if let Some(j) = state.judgment() {
                    prop_assert!(seen[state.id].is_none_or(|prev| prev == j), "note {} re-judged", state.id);
                    seen[state.id] = Some(j);
                }
            }
            Ok(())
        };
        for (dt, gesture) in script {
            now += dt as f64;
            session.advance_to(now);
            if let Some(g) = gesture {
                session.handle_gesture(g);
            }
            check(&session)?;
        }
        session.advance_to(last_note(&chart) + 200.0);
        check(&session)?;
        prop_assert!(seen.iter().all(Option::is_some));
        prop_assert_eq!(session.summary().pending, 0);
    }

    // Any miss batch zeroes the combo with one pulse; max combo never drops.
    #[test]
    fn combo_resets_on_miss_and_max_is_monotone(
        chart in chart_strategy(30),
        script in prop::collection::vec((1u32..34, prop::bool::weighted(0.33)), 0..2000),
    ) {
        let mut session = Session::new(&chart, SessionConfig::default(), Instrument::Drums, CallCatalog::default());
        let mut max_seen = 0;
        let mut now = 0.0;
        for (dt, tap) in script {
            now += dt as f64;
            let before = session.combo();
            let outcome = session.advance_to(now);
            let TickOutcome::Advanced { expired } = outcome else { panic!("unexpected {outcome:?}") };
            let pulses = session
                .drain_events()
                .into_iter()
                .filter(|e| matches!(e, SessionEvent::Feedback(FeedbackKind::Miss)))
                .count();
            if expired > 0 {
                prop_assert_eq!(session.combo(), 0);
                prop_assert_eq!(pulses, 1, "one pulse per batch of {}", expired);
            } else {
                prop_assert_eq!(session.combo(), before);
                prop_assert_eq!(pulses, 0);
            }
            if tap {
                let streak = session.combo();
                if let GestureOutcome::Hit(hit) = session.handle_gesture(Gesture::tap(0.0, 0.0)) {
                    prop_assert_eq!(hit.combo, streak + 1);
                }
            }
            prop_assert!(session.max_combo() >= max_seen);
            prop_assert!(session.max_combo() >= session.combo());
            max_seen = session.max_combo();
        }
    }

    // Spending never drives score below zero and never touches total score.
    #[test]
    fn score_never_negative_and_total_never_spent(
        chart in chart_strategy(60),
        script in prop::collection::vec((1u32..34, gesture_strategy()), 0..3000),
    ) {
        let catalog = CallCatalog::new(vec![
            Call::new("cheap", "Cheap", "", 30),
            Call::new("mid", "Mid", "", 120),
            Call::new("big", "Big", "", 400),
        ]);
        let mut session = Session::new(&chart, SessionConfig::default(), Instrument::Keyboard, catalog);
        let mut now = 0.0;
        let mut spent = 0;
        for (dt, gesture) in script {
            now += dt as f64;
            session.advance_to(now);
            let score_before = session.score();
            let total_before = session.total_score();
            match session.handle_gesture(gesture) {
                GestureOutcome::Call(call) => {
                    prop_assert!(score_before >= call.cost);
                    prop_assert_eq!(session.score(), score_before - call.cost);
                    prop_assert_eq!(session.total_score(), total_before);
                    spent += call.cost;
                }
                GestureOutcome::Hit(hit) => {
                    prop_assert_eq!(session.total_score(), total_before + hit.points);
                }
                GestureOutcome::Ignored => {
                    prop_assert_eq!(session.score(), score_before);
                }
            }
            prop_assert_eq!(session.score() + spent, session.total_score());
        }
    }

    // Visibility is a pure function of (notes, time) and never mutates state.
    #[test]
    fn visible_notes_are_idempotent(chart in chart_strategy(100), step in 10u32..120) {
        let mut scheduler = NoteScheduler::new(&chart);
        let windows = JudgeWindows::default();
        let end = last_note(&chart) + 200.0;
        let mut now = 0.0;
        while now < end {
            now += step as f64;
            scheduler.advance(now, &windows);
            let pending = scheduler.pending_count();
            let a: Vec<_> = scheduler.visible_notes(now, 1500.0, windows.good).collect();
            let b: Vec<_> = scheduler.visible_notes(now, 1500.0, windows.good).collect();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(scheduler.pending_count(), pending);
            prop_assert!(a.iter().all(|v| (0.0..=1.0).contains(&v.progress)));
        }
        prop_assert!(scheduler.all_resolved());
    }
}
