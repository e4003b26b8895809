//! # Scenario Tests
//!
//! End-to-end behavior of the CPU running real puzzle processes.

use std::cell::RefCell;
use std::rc::Rc;
use towers_core::{
    ContradictionKind, Direction, Hints, Line, OnlyChoiceProcess, Outcome, Process, Puzzle,
    PuzzleScheduler, PuzzleSeed, RemoveFromLineProcess, Triple, ValidationProcess,
};

/// Zero-based solution of the demo puzzle shipped under `demos/`.
const SOLUTION: [[usize; 4]; 4] = [
    [1, 0, 3, 2],
    [2, 3, 0, 1],
    [3, 2, 1, 0],
    [0, 1, 2, 3],
];

fn demo_puzzle() -> Puzzle {
    let edge = |hints: [usize; 4]| hints.into_iter().map(Some).collect::<Vec<_>>();
    Puzzle::from_seed(PuzzleSeed {
        size: 4,
        hints: Hints {
            top: edge([3, 2, 1, 2]),
            bottom: edge([2, 3, 2, 1]),
            left: edge([2, 2, 1, 4]),
            right: edge([2, 2, 4, 1]),
        },
        givens: Vec::new(),
    })
    .expect("demo seed")
}

fn run_until_idle(scheduler: &mut PuzzleScheduler, puzzle: &mut Puzzle) {
    for _ in 0..100_000 {
        if scheduler.is_idle() {
            return;
        }
        scheduler.pulse(puzzle);
    }
    unreachable!("scheduler never went idle");
}

// =============================================================================
// SCHEDULING
// =============================================================================

mod scheduling {
    use super::*;

    /// With one core, a later higher-priority submission is admitted first.
    #[test]
    fn higher_priority_is_admitted_first() {
        let mut puzzle = demo_puzzle();
        puzzle.set_cell(0, 0, 1).expect("in grid");
        let mut scheduler = PuzzleScheduler::with_capacity(1, 3000);

        let blocker = RemoveFromLineProcess::row(Triple::new(0, 0, 1));
        let p1 = OnlyChoiceProcess::new(Line::Row(1), 0);
        let p2 = OnlyChoiceProcess::new(Line::Row(2), 0);
        let expected = vec![
            blocker.process_id().clone(),
            p2.process_id().clone(),
            p1.process_id().clone(),
        ];

        assert!(scheduler.add_process(Box::new(blocker), 0, None));
        assert!(scheduler.add_process(Box::new(p1), 5, None));
        assert!(scheduler.add_process(Box::new(p2), 9, None));

        let mut admitted = Vec::new();
        for _ in 0..1000 {
            for id in scheduler.active_processes() {
                if !admitted.contains(id) {
                    admitted.push(id.clone());
                }
            }
            if scheduler.is_idle() {
                break;
            }
            scheduler.pulse(&mut puzzle);
        }
        assert_eq!(admitted, expected);
    }

    /// Completion callbacks receive the outcome; RAM is released after.
    #[test]
    fn callback_receives_outcome() {
        let mut puzzle = demo_puzzle();
        puzzle.set_cell(1, 1, 3).expect("in grid");
        let mut scheduler = PuzzleScheduler::default();
        let seen = Rc::new(RefCell::new(None));

        let sink = Rc::clone(&seen);
        scheduler.add_process(
            Box::new(RemoveFromLineProcess::column(Triple::new(1, 1, 3))),
            0,
            Some(Box::new(move |outcome: Outcome| {
                *sink.borrow_mut() = Some(outcome);
            })),
        );
        run_until_idle(&mut scheduler, &mut puzzle);

        assert_eq!(*seen.borrow(), Some(Outcome::Eliminated { removed: 3 }));
        assert_eq!(scheduler.ram().used(), 0);
    }
}

// =============================================================================
// INFERENCE
// =============================================================================

mod inference {
    use super::*;

    /// Row elimination leaves no other cell of row 0 holding the value.
    #[test]
    fn row_elimination() {
        let mut puzzle = Puzzle::blank(4).expect("puzzle");
        puzzle.set_cell(0, 0, 2).expect("in grid");
        let mut scheduler = PuzzleScheduler::default();

        scheduler.add_process(
            Box::new(RemoveFromLineProcess::row(Triple::new(0, 0, 2))),
            0,
            None,
        );
        run_until_idle(&mut scheduler, &mut puzzle);

        for col in 1..4 {
            assert!(!puzzle.marks_cell(0, col).contains(&2));
        }
        assert_eq!(puzzle.solved_value(0, 0), Some(2));
    }

    /// Two cells of one row forced to the same value fail validation, and
    /// the log names the failing row comparison.
    #[test]
    fn contradiction_fails_validation() {
        let mut puzzle = demo_puzzle();
        for (row, values) in SOLUTION.iter().enumerate() {
            for (col, &val) in values.iter().enumerate() {
                puzzle.set_cell(row, col, val).expect("in grid");
            }
        }
        // (0, 1) already holds a 1; force (0, 2) to a 1 as well.
        puzzle.set_cell(0, 2, 0).expect("in grid");

        let result = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&result);
        let mut scheduler = PuzzleScheduler::default();
        scheduler.add_process(
            Box::new(ValidationProcess::new()),
            0,
            Some(Box::new(move |outcome: Outcome| {
                *sink.borrow_mut() = Some(outcome);
            })),
        );
        run_until_idle(&mut scheduler, &mut puzzle);

        let Some(Outcome::Validation { valid, log }) = result.borrow().clone() else {
            unreachable!("validation did not report");
        };
        assert!(!valid);
        assert!(log.iter().any(|line| line == "row 0: (0, 1)=1 vs (0, 2)=1 duplicate"));
    }

    /// A guess that leads to a contradiction is reverted and excluded.
    #[test]
    fn contradiction_then_revert() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.set_cell(0, 2, 1).expect("in grid");
        let base = puzzle.history_len();

        assert!(puzzle.take_guess(Triple::new(0, 0, 1)).expect("in grid"));
        let mut scheduler = PuzzleScheduler::default();
        scheduler.add_process(
            Box::new(RemoveFromLineProcess::row(Triple::new(0, 0, 1))),
            0,
            None,
        );
        run_until_idle(&mut scheduler, &mut puzzle);

        let contradiction = puzzle.contradiction().cloned().expect("contradiction");
        assert_eq!(
            contradiction.kind,
            ContradictionKind::Row {
                row: 0,
                cols: vec![0, 2],
                val: 1
            }
        );

        assert_eq!(puzzle.mark_guess_as_impossible(), Some(Triple::new(0, 0, 1)));
        assert!(puzzle.contradiction().is_none());
        assert_eq!(puzzle.history_len(), base + 1);
        assert!(!puzzle.is_possible(Triple::new(0, 0, 1)));
    }

    /// The full solution of the demo passes every check.
    #[test]
    fn demo_solution_validates() {
        let mut puzzle = demo_puzzle();
        for (row, values) in SOLUTION.iter().enumerate() {
            for (col, &val) in values.iter().enumerate() {
                puzzle.set_cell(row, col, val).expect("in grid");
            }
        }
        assert!(puzzle.is_ready_for_validation());
        assert_eq!(puzzle.hint(Direction::Top, 0), Some(3));

        let mut process = ValidationProcess::new();
        let mut ticks = 1;
        while !process.tick(&mut puzzle) {
            ticks += 1;
        }
        assert!(ticks > 16);

        assert!(matches!(
            process.return_value(),
            Outcome::Validation { valid: true, .. }
        ));
    }
}
