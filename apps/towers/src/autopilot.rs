//! # Autopilot
//!
//! Decides what the CPU works on.
//!
//! Whenever the scheduler runs dry the autopilot looks at the puzzle and
//! plans a round of inference processes. A round that changes nothing is
//! followed by a random guess; a fully solved grid is handed to the
//! validator. Contradictions kill everything on the CPU and backtrack the
//! most recent guess, which turns the whole loop into a depth-first search.
//! An only-choice scan that finds no cell for a value is turned into a row
//! or column contradiction here.
//!
//! ```text
//!   idle ──▶ plan round ──▶ pulses ──▶ idle ──▶ progress? ──yes──▶ plan round
//!                                                 │
//!                                                 no ──▶ guess ──▶ plan round
//!   contradiction ──▶ kill all ──▶ mark guess impossible ──▶ plan round
//!   all cells solved ──▶ validate ──▶ solved | backtrack
//! ```

use crate::config::{AutopilotConfig, TowersConfig};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use towers_core::{
    Action, CellVisibilityProcess, ContradictionKind, FollowImplicationsProcess,
    HintBoundsProcess, HistoryEvent, Line, OnlyChoiceProcess, Outcome, PairImplicationsProcess, Puzzle, PuzzleProcess,
    PuzzleScheduler, RandomGuessProcess, RemoveFromLineProcess, SchedulerConfig,
    TowerVisibilityProcess, Triple, Unit, ValidationProcess,
};
use tracing::{debug, info, warn};

// =============================================================================
// PRIORITIES
// =============================================================================

const PRIORITY_VALIDATION: i64 = 20;
const PRIORITY_BOUNDS: i64 = 10;
const PRIORITY_ELIMINATE: i64 = 8;
const PRIORITY_FOLLOW: i64 = 6;
const PRIORITY_ONLY_CHOICE: i64 = 4;
const PRIORITY_VISIBILITY: i64 = 2;
const PRIORITY_PAIRS: i64 = 0;
const PRIORITY_GUESS: i64 = -10;

// =============================================================================
// VERDICTS AND STATS
// =============================================================================

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Every cell solved and the validator agreed.
    Solved,
    /// A contradiction (or failed validation) with no guess left to revert.
    Unsolvable { reason: String },
    /// Nothing left to try.
    Stuck { reason: String },
    /// The pulse limit was reached.
    OutOfPulses { pulses: u64 },
    /// Stopped from outside.
    Stopped,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Solved => write!(f, "solved"),
            Verdict::Unsolvable { reason } => write!(f, "unsolvable: {}", reason),
            Verdict::Stuck { reason } => write!(f, "stuck: {}", reason),
            Verdict::OutOfPulses { pulses } => write!(f, "gave up after {} pulses", pulses),
            Verdict::Stopped => write!(f, "stopped"),
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub rounds: u64,
    pub submitted: u64,
    pub completed: u64,
    pub guesses: u64,
    pub backtracks: u64,
    pub contradictions: u64,
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub verdict: Option<Verdict>,
    pub pulses: u64,
    pub stats: Stats,
    /// One-based heights; `None` for unsolved cells.
    pub grid: Vec<Vec<Option<usize>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing planned yet since start or the last backtrack.
    Fresh,
    /// A round is on the CPU; history length when it was planned.
    Inference { started_at: usize },
    Guessing,
    Validating,
}

// =============================================================================
// AUTOPILOT
// =============================================================================

/// Owns the puzzle and the CPU and keeps the CPU busy.
#[derive(Debug)]
pub struct Autopilot {
    puzzle: Puzzle,
    cpu: PuzzleScheduler,
    config: AutopilotConfig,
    phase: Phase,
    /// Outcomes delivered by completion callbacks since the last decision.
    inbox: Rc<RefCell<Vec<Outcome>>>,
    bounds_planned: bool,
    /// Solved triples whose row and column were already cleared.
    eliminated: BTreeSet<Triple>,
    /// Solved triples whose implications were already followed.
    followed: BTreeSet<Triple>,
    /// Excluded triples whose implications were already followed.
    followed_removals: BTreeSet<Triple>,
    implications_added: Rc<Cell<u64>>,
    implications_seen: u64,
    contradictions: Rc<Cell<u64>>,
    stats: Stats,
    verdict: Option<Verdict>,
}

impl Autopilot {
    /// Take over `puzzle` with a CPU shaped by `config`.
    pub fn new(mut puzzle: Puzzle, config: &TowersConfig) -> Self {
        let implications_added = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&implications_added);
        puzzle.on_action(move |event| {
            if matches!(event, HistoryEvent::Applied(Action::AddImplication { .. })) {
                counter.set(counter.get().saturating_add(1));
            }
        });

        let contradictions = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&contradictions);
        puzzle.on_contradiction(move |contradiction| {
            debug!(%contradiction, "contradiction observed");
            counter.set(counter.get().saturating_add(1));
        });

        Self {
            puzzle,
            cpu: PuzzleScheduler::new(&config.scheduler),
            config: config.autopilot.clone(),
            phase: Phase::Fresh,
            inbox: Rc::new(RefCell::new(Vec::new())),
            bounds_planned: false,
            eliminated: BTreeSet::new(),
            followed: BTreeSet::new(),
            followed_removals: BTreeSet::new(),
            implications_added,
            implications_seen: 0,
            contradictions,
            stats: Stats::default(),
            verdict: None,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn scheduler(&self) -> &PuzzleScheduler {
        &self.cpu
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            contradictions: self.contradictions.get(),
            ..self.stats
        }
    }

    /// Summary of the run so far.
    pub fn report(&self) -> Report {
        let size = self.puzzle.size();
        let grid = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| {
                        self.puzzle
                            .solved_value(row, col)
                            .map(|val| val.saturating_add(1))
                    })
                    .collect()
            })
            .collect();
        Report {
            verdict: self.verdict.clone(),
            pulses: self.cpu.pulse_count(),
            stats: self.stats(),
            grid,
        }
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Make at most one decision, then run one pulse.
    ///
    /// Returns `true` once the run has a verdict.
    pub fn step(&mut self) -> bool {
        if self.verdict.is_some() {
            return true;
        }

        if let Some(contradiction) = self.puzzle.contradiction() {
            let reason = contradiction.to_string();
            self.backtrack(reason);
            return self.verdict.is_some();
        }

        if self.cpu.is_idle() {
            self.steer();
            if self.verdict.is_some() {
                return true;
            }
        }

        self.cpu.pulse(&mut self.puzzle);

        let pulses = self.cpu.pulse_count();
        if self.config.max_pulses > 0 && pulses >= self.config.max_pulses {
            warn!(pulses, "pulse limit reached");
            self.verdict = Some(Verdict::OutOfPulses { pulses });
        }
        self.verdict.is_some()
    }

    /// Run as many pulses as `elapsed` wall-clock time is worth.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let pulses = self.cpu.clock_mut().pulses_for(elapsed);
        for _ in 0..pulses {
            if self.step() {
                break;
            }
        }
        self.verdict.is_some()
    }

    /// Run until there is a verdict.
    pub fn solve(&mut self) -> Verdict {
        while !self.step() {}
        self.verdict.clone().unwrap_or(Verdict::Stopped)
    }

    /// Kill everything and end the run.
    pub fn stop(&mut self) {
        if self.verdict.is_none() {
            self.cpu.kill_all();
            self.verdict = Some(Verdict::Stopped);
        }
    }

    // -------------------------------------------------------------------------
    // Decisions
    // -------------------------------------------------------------------------

    /// Called with an idle CPU: read what the last batch reported and
    /// queue the next one.
    fn steer(&mut self) {
        let outcomes: Vec<Outcome> = self.inbox.borrow_mut().drain(..).collect();
        self.stats.completed = self.stats.completed.saturating_add(outcomes.len() as u64);

        match self.phase {
            Phase::Fresh => self.plan_or_conclude(true),
            Phase::Inference { started_at } => {
                if let Some(kind) = outcomes.iter().find_map(missing_value) {
                    self.puzzle.raise_contradiction(kind);
                    return;
                }
                let progressed = self.puzzle.history_len() != started_at;
                self.plan_or_conclude(progressed);
            }
            Phase::Guessing => {
                let guessed = outcomes.iter().find_map(|outcome| match outcome {
                    Outcome::Guess(triple) => *triple,
                    _ => None,
                });
                if guessed.is_some() {
                    self.stats.guesses = self.stats.guesses.saturating_add(1);
                    self.plan_round();
                } else {
                    self.conclude_stuck("no guess left to take");
                }
            }
            Phase::Validating => {
                let result = outcomes.into_iter().find_map(|outcome| match outcome {
                    Outcome::Validation { valid, log } => Some((valid, log)),
                    _ => None,
                });
                match result {
                    Some((true, _)) => {
                        info!(pulses = self.cpu.pulse_count(), "puzzle solved");
                        self.verdict = Some(Verdict::Solved);
                    }
                    Some((false, log)) => {
                        let failure = log.last().cloned().unwrap_or_default();
                        self.backtrack(format!("validation failed: {}", failure));
                    }
                    None => self.conclude_stuck("validation did not report"),
                }
            }
        }
    }

    fn plan_or_conclude(&mut self, progressed: bool) {
        if self.puzzle.is_ready_for_validation() {
            if self.submit(Box::new(ValidationProcess::new()), PRIORITY_VALIDATION) {
                self.phase = Phase::Validating;
            } else {
                self.conclude_stuck("validation does not fit in RAM");
            }
        } else if progressed {
            self.plan_round();
        } else if self.config.guessing {
            if self.submit(Box::new(RandomGuessProcess::new()), PRIORITY_GUESS) {
                self.phase = Phase::Guessing;
            } else {
                self.conclude_stuck("random guess does not fit in RAM");
            }
        } else {
            self.conclude_stuck("no progress and guessing is disabled");
        }
    }

    /// Queue one pass of every inference that could still apply.
    fn plan_round(&mut self) {
        let size = self.puzzle.size();
        let started_at = self.puzzle.history_len();
        self.stats.rounds = self.stats.rounds.saturating_add(1);

        // New implications can force more from triples already followed.
        let added = self.implications_added.get();
        if added != self.implications_seen {
            self.implications_seen = added;
            self.followed.clear();
            self.followed_removals.clear();
        }

        if !self.bounds_planned {
            self.bounds_planned = true;
            self.submit(Box::new(HintBoundsProcess::new()), PRIORITY_BOUNDS);
        }

        for row in 0..size {
            for col in 0..size {
                let Some(val) = self.puzzle.solved_value(row, col) else {
                    continue;
                };
                let triple = Triple::new(row, col, val);
                if self.eliminated.insert(triple) {
                    self.submit(
                        Box::new(RemoveFromLineProcess::row(triple)),
                        PRIORITY_ELIMINATE,
                    );
                    self.submit(
                        Box::new(RemoveFromLineProcess::column(triple)),
                        PRIORITY_ELIMINATE,
                    );
                }
                if self.config.follow_implications && self.followed.insert(triple) {
                    self.submit(
                        Box::new(FollowImplicationsProcess::set(triple)),
                        PRIORITY_FOLLOW,
                    );
                }
            }
        }

        if self.config.follow_implications {
            self.plan_removal_follows();
        }

        for index in 0..size {
            for val in 0..size {
                for line in [Line::Row(index), Line::Column(index)] {
                    let placed = line
                        .cells(size)
                        .into_iter()
                        .any(|(row, col)| self.puzzle.solved_value(row, col) == Some(val));
                    if !placed {
                        self.submit(
                            Box::new(OnlyChoiceProcess::new(line, val)),
                            PRIORITY_ONLY_CHOICE,
                        );
                    }
                }
            }
        }

        let hinted: Vec<_> = self
            .puzzle
            .hints()
            .iter()
            .map(|(direction, index, _)| (direction, index))
            .collect();
        for (direction, index) in hinted {
            self.submit(
                Box::new(CellVisibilityProcess::new(direction, index)),
                PRIORITY_VISIBILITY,
            );
            self.submit(
                Box::new(TowerVisibilityProcess::new(direction, index)),
                PRIORITY_VISIBILITY,
            );
        }

        let pairs: Vec<Unit> = (0..size)
            .flat_map(|a| {
                (0..size).flat_map(move |b| {
                    [
                        Unit::Row { row: a, val: b },
                        Unit::Column { col: a, val: b },
                        Unit::Cell { row: a, col: b },
                    ]
                })
            })
            .filter(|unit| unit.candidates(&self.puzzle).len() == 2)
            .collect();
        for unit in pairs {
            self.submit(Box::new(PairImplicationsProcess::new(unit)), PRIORITY_PAIRS);
        }

        self.phase = Phase::Inference { started_at };
        debug!(
            round = self.stats.rounds,
            queued = self.cpu.queued_processes().count(),
            active = self.cpu.cores_in_use(),
            "round planned"
        );
    }

    /// Follow every newly excluded triple whose removal forces something
    /// not yet on the grid.
    fn plan_removal_follows(&mut self) {
        let size = self.puzzle.size();
        for row in 0..size {
            for col in 0..size {
                let marks = self.puzzle.marks_cell(row, col);
                for val in (0..size).filter(|val| !marks.contains(val)) {
                    let triple = Triple::new(row, col, val);
                    if self.followed_removals.insert(triple) && self.removal_forces(triple) {
                        self.submit(
                            Box::new(FollowImplicationsProcess::removal(triple)),
                            PRIORITY_FOLLOW,
                        );
                    }
                }
            }
        }
    }

    fn removal_forces(&self, triple: Triple) -> bool {
        let closure = self
            .puzzle
            .implications()
            .implications_from_node_removal(triple);
        closure
            .set
            .iter()
            .any(|t| self.puzzle.solved_value(t.row, t.col) != Some(t.val))
            || closure
                .excluded
                .iter()
                .any(|&t| t != triple && self.puzzle.is_possible(t))
    }

    /// Drop all work and revert the latest guess, excluding it.
    fn backtrack(&mut self, reason: String) {
        self.cpu.kill_all();
        self.inbox.borrow_mut().clear();

        match self.puzzle.mark_guess_as_impossible() {
            Some(triple) => {
                self.stats.backtracks = self.stats.backtracks.saturating_add(1);
                info!(guess = %triple, %reason, "guess marked impossible");
                self.phase = Phase::Fresh;
                self.eliminated.clear();
                self.followed.clear();
                self.followed_removals.clear();
            }
            None => {
                info!(%reason, "no guess left to revert");
                self.verdict = Some(Verdict::Unsolvable { reason });
            }
        }
    }

    fn conclude_stuck(&mut self, reason: &str) {
        warn!(reason, "autopilot stuck");
        self.verdict = Some(Verdict::Stuck {
            reason: reason.to_string(),
        });
    }

    fn submit(&mut self, process: PuzzleProcess, priority: i64) -> bool {
        let inbox = Rc::clone(&self.inbox);
        let accepted = self.cpu.add_process(
            process,
            priority,
            Some(Box::new(move |outcome: Outcome| {
                inbox.borrow_mut().push(outcome);
            })),
        );
        if accepted {
            self.stats.submitted = self.stats.submitted.saturating_add(1);
        }
        accepted
    }
}

/// A value an only-choice scan found no cell for.
fn missing_value(outcome: &Outcome) -> Option<ContradictionKind> {
    match *outcome {
        Outcome::OnlyChoice {
            line,
            val,
            candidates: 0,
            ..
        } => Some(match line {
            Line::Row(row) => ContradictionKind::Row {
                row,
                cols: Vec::new(),
                val,
            },
            Line::Column(col) => ContradictionKind::Column {
                col,
                rows: Vec::new(),
                val,
            },
        }),
        _ => None,
    }
}

// =============================================================================
// ONE-SHOT VALIDATION
// =============================================================================

/// Run a single validation pass on its own CPU.
///
/// Returns `None` if the validator does not fit in the configured RAM.
pub fn validate(puzzle: &mut Puzzle, config: &SchedulerConfig) -> Option<(bool, Vec<String>)> {
    let mut cpu = PuzzleScheduler::new(config);
    let result = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&result);

    let accepted = cpu.add_process(
        Box::new(ValidationProcess::new()),
        PRIORITY_VALIDATION,
        Some(Box::new(move |outcome: Outcome| {
            if let Outcome::Validation { valid, log } = outcome {
                *sink.borrow_mut() = Some((valid, log));
            }
        })),
    );
    if !accepted {
        return None;
    }
    while !cpu.is_idle() {
        cpu.pulse(puzzle);
    }
    result.borrow_mut().take()
}

// =============================================================================
// TESTS
// =============================================================================
