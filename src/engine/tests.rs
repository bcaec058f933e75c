use std::sync::Arc;

use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::config::{RelatedWindowRule, Settings};
use crate::engine::{ActionReport, DesktopEngine, Destination, EngineError, MoveKind, Request};
use crate::model::AxisError;
use crate::sys::desktop::{DesktopOps, NativeError};
use crate::sys::simulated::SimulatedDesktops;

fn engine_on(desktops: usize) -> (Arc<SimulatedDesktops>, DesktopEngine) {
    engine_with(desktops, Settings { history_capacity: 64, ..Settings::default() })
}

fn engine_with(desktops: usize, settings: Settings) -> (Arc<SimulatedDesktops>, DesktopEngine) {
    let sim = Arc::new(SimulatedDesktops::with_desktops(desktops));
    let engine = DesktopEngine::new(sim.clone(), &settings).unwrap();
    (sim, engine)
}

fn editor_settings() -> Settings {
    Settings {
        related_windows: vec![RelatedWindowRule {
            title_key: r" - (\S+) - (?:Visual Studio Code|Obsidian)".into(),
        }],
        ..Settings::default()
    }
}

fn end_index(report: &ActionReport) -> usize {
    report.switched.expect("expected a desktop switch").end.index
}

mod pan {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn directional_pan_wraps_around_the_axis() {
        let (sim, engine) = engine_on(3);
        assert_eq!(sim.current_index(), 1);

        for expected in [2, 3, 1] {
            let report = engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
            assert_eq!(end_index(&report), expected);
            assert_eq!(sim.current_index(), expected);
        }

        let report = engine.resolve(MoveKind::Pan, Destination::Left).unwrap();
        assert_eq!(end_index(&report), 3);
    }

    #[test]
    fn absolute_pan_lands_on_the_slot() {
        let (sim, engine) = engine_on(5);
        let report = engine.resolve(MoveKind::Pan, Destination::Slot(4)).unwrap();
        assert_eq!(end_index(&report), 4);
        assert_eq!(report.switched.unwrap().start.index, 1);
        assert_eq!(report.moved, None);
        assert_eq!(sim.current_index(), 4);
    }

    #[test]
    fn absolute_pan_out_of_range_is_a_failure_result() {
        let (sim, engine) = engine_on(3);
        let failure = engine.resolve(MoveKind::Pan, Destination::Slot(9)).unwrap_err();
        assert_eq!(
            failure.request,
            Request::Move { kind: MoveKind::Pan, to: Destination::Slot(9) }
        );
        assert_eq!(
            failure.source,
            EngineError::OutOfRange(AxisError::OutOfRange { index: 9, total: 3 })
        );
        // Nothing switched, nothing recorded.
        assert_eq!(sim.switch_count(), 0);
        assert_eq!(engine.history_snapshot().0.len(), 1);
    }

    #[test]
    fn pan_pushes_history() {
        let (_sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        let (entries, cursor) = engine.history_snapshot();
        let indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(cursor, 2);
    }
}

mod shove_and_drag {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn shove_moves_the_group_without_switching() {
        let (sim, engine) = engine_with(3, editor_settings());
        let main = sim.open_window(42, "main.rs - pandesk - Visual Studio Code");
        let side = sim.open_window(42, "lib.rs - pandesk - Visual Studio Code");
        let other = sim.open_window(42, "todo - vault - Obsidian");
        sim.focus(main);

        let report = engine.resolve(MoveKind::Shove, Destination::Right).unwrap();
        let moved = report.moved.unwrap();
        assert_eq!(moved.windows.len(), 2);
        assert_eq!(report.switched, None);

        let target = sim.ids()[1];
        assert_eq!(sim.desktop_of(main), Some(target));
        assert_eq!(sim.desktop_of(side), Some(target));
        // Different instance key, left behind.
        assert_eq!(sim.desktop_of(other), Some(sim.ids()[0]));
        assert_eq!(sim.current_index(), 1);
    }

    #[test]
    fn shove_does_not_push_history() {
        let (sim, engine) = engine_with(3, editor_settings());
        sim.open_window(42, "main.rs - pandesk - Visual Studio Code");
        engine.resolve(MoveKind::Shove, Destination::Right).unwrap();
        assert_eq!(engine.history_snapshot().0.len(), 1);
    }

    #[test]
    fn drag_moves_and_switches_with_one_history_entry() {
        let (sim, engine) = engine_with(3, editor_settings());
        let main = sim.open_window(42, "main.rs - pandesk - Visual Studio Code");

        let report = engine.resolve(MoveKind::Drag, Destination::Slot(3)).unwrap();
        assert_eq!(end_index(&report), 3);
        assert_eq!(report.moved.as_ref().unwrap().windows.len(), 1);

        assert_eq!(sim.current_index(), 3);
        assert_eq!(sim.desktop_of(main), Some(sim.ids()[2]));

        let (entries, cursor) = engine.history_snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn shove_without_a_focused_window_is_a_failure_result() {
        let (_sim, engine) = engine_on(3);
        let failure = engine.resolve(MoveKind::Shove, Destination::Right).unwrap_err();
        assert!(matches!(failure.source, EngineError::Native(NativeError::Backend(_))));
    }
}

mod replay {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn undo_returns_to_the_previous_desktop_without_new_entries() {
        let (sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        assert_eq!(sim.current_index(), 3);

        let report = engine.undo().unwrap();
        assert_eq!(end_index(&report), 2);
        assert_eq!(sim.current_index(), 2);

        // Replays never extend history.
        let (entries, cursor) = engine.history_snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn redo_walks_forward_again() {
        let (sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.undo().unwrap();
        let report = engine.redo().unwrap();
        assert_eq!(end_index(&report), 2);
        assert_eq!(sim.current_index(), 2);
    }

    #[test]
    fn exhausted_history_is_a_failure_result() {
        let (_sim, engine) = engine_on(3);
        let failure = engine.undo().unwrap_err();
        assert_eq!(failure.request, Request::Undo);
        assert!(matches!(failure.source, EngineError::History(_)));
        assert!(engine.redo().is_err());
    }

    #[test]
    fn pan_after_undo_discards_the_redo_branch() {
        let (_sim, engine) = engine_on(4);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.undo().unwrap();
        engine.resolve(MoveKind::Pan, Destination::Slot(4)).unwrap();

        let (entries, cursor) = engine.history_snapshot();
        let indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(cursor, 2);
        assert!(engine.redo().is_err());
    }

    #[test]
    fn undo_to_a_deleted_desktop_falls_back_by_index() {
        let (sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();

        // The desktop recorded at index 2 disappears; its old slot is now
        // occupied by the desktop we are standing on.
        let deleted = sim.ids()[1];
        assert!(sim.remove_desktop(deleted));

        let report = engine.undo().unwrap();
        assert_eq!(end_index(&report), 2);
        assert_eq!(sim.current_index(), 2);
    }

    #[test]
    fn failed_replay_puts_the_cursor_back() {
        let (sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();

        sim.fail_next(3);
        assert!(engine.undo().is_err());

        // The cursor was restored, so the same undo works once the
        // backend recovers.
        let report = engine.undo().unwrap();
        assert_eq!(end_index(&report), 1);
        assert_eq!(sim.current_index(), 1);
    }
}

mod recovery {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn pan_recovers_from_a_single_stale_failure() {
        let (sim, engine) = engine_on(3);
        sim.fail_next(1);
        let report = engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        assert_eq!(end_index(&report), 2);
        assert_eq!(sim.reinit_count(), 1);
    }

    #[test]
    fn persistent_stale_failure_escalates() {
        let (sim, engine) = engine_on(3);
        // Enough scripted failures to survive the reinit-and-retry.
        sim.fail_next(4);
        let failure = engine.resolve(MoveKind::Pan, Destination::Right).unwrap_err();
        assert!(matches!(failure.source, EngineError::Native(NativeError::Stale(_))));
        assert_eq!(sim.reinit_count(), 1);
        assert_eq!(sim.switch_count(), 0);
    }
}

mod sampling {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn sample_records_switches_made_outside_the_engine() {
        let (sim, engine) = engine_on(3);
        sim.switch_to(sim.ids()[2]).unwrap();

        assert_eq!(engine.sample().unwrap(), true);
        let (entries, cursor) = engine.history_snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 3);
        assert_eq!(cursor, 1);

        // Sampling the same desktop again is a no-op.
        assert_eq!(engine.sample().unwrap(), false);
        assert_eq!(engine.history_snapshot().0.len(), 2);
    }

    #[test]
    fn sample_after_undo_does_not_branch() {
        let (_sim, engine) = engine_on(3);
        engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        engine.undo().unwrap();
        // The sampler sees the desktop undo switched to; identity-equal to
        // the cursor entry, so the redo branch survives.
        assert_eq!(engine.sample().unwrap(), false);
        assert!(engine.redo().is_ok());
    }

    #[test]
    fn sample_failure_is_tagged_with_its_request() {
        let (sim, engine) = engine_on(3);
        sim.fail_next(4);
        let failure = engine.sample().unwrap_err();
        assert_eq!(failure.request, Request::Sample);
    }
}

mod capacity {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn history_capacity_evicts_oldest_entries() {
        let (_sim, engine) =
            engine_with(6, Settings { history_capacity: 3, ..Settings::default() });
        for slot in 2..=6 {
            engine.resolve(MoveKind::Pan, Destination::Slot(slot)).unwrap();
        }
        let (entries, cursor) = engine.history_snapshot();
        let indices: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![4, 5, 6]);
        assert_eq!(cursor, 2);
    }
}

mod end_to_end {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn pan_then_undo_round_trip() {
        // Three desktops, starting in the middle.
        let (sim, engine) = engine_on(3);
        sim.switch_to(sim.ids()[1]).unwrap();
        engine.sample().unwrap();

        let report = engine.resolve(MoveKind::Pan, Destination::Right).unwrap();
        assert_eq!(end_index(&report), 3);
        let (entries, _) = engine.history_snapshot();
        assert_eq!(entries.last().unwrap().id, sim.ids()[2]);

        let before = engine.history_snapshot().0.len();
        let report = engine.undo().unwrap();
        assert_eq!(end_index(&report), 2);
        assert_eq!(sim.current_index(), 2);
        assert_eq!(engine.history_snapshot().0.len(), before);
    }
}
