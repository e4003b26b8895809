//! # Scheduler (CPU)
//!
//! Admits, runs, and retires processes under a core limit and a RAM budget.
//!
//! ## Execution Model
//!
//! - Single-threaded and cooperative: processes are advanced strictly one
//!   after another within a pulse, in admission order.
//! - Pulses alternate between the **normal lane** (every active process
//!   ticks once) and the **boost lane** (only the boosted process ticks).
//!   Without a boosted process every pulse runs the normal lane.
//! - Processes that finish during a pulse are retired at the end of that
//!   pulse, never mid-iteration. Freed cores and RAM are then backfilled
//!   from the queue.
//! - Admission is strict priority order: a queue head that does not fit in
//!   the remaining RAM blocks everything behind it.
//!
//! Admission and retirement are the only places resources change hands
//! (plus explicit kills). Nothing is rolled back when a process is killed.

pub mod clock;
pub mod process;

pub use clock::PulseClock;
pub use process::{Beat, Process};

use crate::primitives::{
    DEFAULT_CORES, DEFAULT_PULSES_PER_SECOND, DEFAULT_RAM_CAPACITY, DEFAULT_SPEED_PERCENT,
    SLOW_TICK_BUDGET,
};
use crate::priority_queue::PriorityQueue;
use crate::resources::ResourceManager;
use crate::types::ProcessId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A boxed process with a fixed context and output type.
pub type BoxedProcess<C, O> = Box<dyn Process<C, Output = O>>;

/// Completion callback, invoked once with the process return value.
pub type Callback<O> = Box<dyn FnOnce(O)>;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Static shape of the simulated computer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of simultaneously active processes.
    pub cores: usize,
    /// RAM capacity shared by all active processes.
    pub ram: u64,
    /// Pulses per second at 100% speed.
    pub pulses_per_second: u64,
    /// Speed multiplier in percent.
    pub speed_percent: u64,
    /// Ticks slower than this many milliseconds are logged.
    pub slow_tick_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cores: DEFAULT_CORES,
            ram: DEFAULT_RAM_CAPACITY,
            pulses_per_second: DEFAULT_PULSES_PER_SECOND,
            speed_percent: DEFAULT_SPEED_PERCENT,
            slow_tick_ms: SLOW_TICK_BUDGET.as_millis() as u64,
        }
    }
}

// =============================================================================
// LANES AND REPORTS
// =============================================================================

/// Which processes a pulse advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Every active process ticks once.
    Normal,
    /// Only the boosted process ticks, if there is one.
    Boost,
}

impl Lane {
    const fn next(self) -> Self {
        match self {
            Lane::Normal => Lane::Boost,
            Lane::Boost => Lane::Normal,
        }
    }
}

/// What happened during one pulse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseReport {
    pub lane: Lane,
    /// Number of `tick()` calls made.
    pub ticked: usize,
    /// Processes retired at the end of the pulse.
    pub retired: Vec<ProcessId>,
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// The CPU: a bounded set of active processes fed from a priority queue.
pub struct Scheduler<C, O> {
    cores: usize,
    ram: ResourceManager<ProcessId>,
    active: Vec<BoxedProcess<C, O>>,
    queue: PriorityQueue<BoxedProcess<C, O>>,
    callbacks: BTreeMap<ProcessId, Callback<O>>,
    /// Every id currently active or queued.
    registered: BTreeSet<ProcessId>,
    boosted: Option<ProcessId>,
    lane: Lane,
    clock: PulseClock,
    slow_tick_budget: Duration,
    pulses: u64,
}

impl<C, O> fmt::Debug for Scheduler<C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("cores", &self.cores)
            .field("ram_used", &self.ram.used())
            .field("active", &self.active_processes().collect::<Vec<_>>())
            .field("queued", &self.queued_processes().collect::<Vec<_>>())
            .field("boosted", &self.boosted)
            .field("pulses", &self.pulses)
            .finish()
    }
}

impl<C, O> Default for Scheduler<C, O> {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl<C, O> Scheduler<C, O> {
    /// Build a scheduler from its configuration.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            cores: config.cores,
            ram: ResourceManager::new(config.ram),
            active: Vec::new(),
            queue: PriorityQueue::new(),
            callbacks: BTreeMap::new(),
            registered: BTreeSet::new(),
            boosted: None,
            lane: Lane::Normal,
            clock: PulseClock::new(config.pulses_per_second, config.speed_percent),
            slow_tick_budget: Duration::from_millis(config.slow_tick_ms),
            pulses: 0,
        }
    }

    /// Build a scheduler with the given core count and RAM capacity.
    #[must_use]
    pub fn with_capacity(cores: usize, ram: u64) -> Self {
        Self::new(&SchedulerConfig {
            cores,
            ram,
            ..SchedulerConfig::default()
        })
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Register a process and admit as much of the queue as fits.
    ///
    /// Returns `false` if a process with the same id is already registered,
    /// or if the process needs more RAM than the machine has at all.
    pub fn add_process(
        &mut self,
        process: BoxedProcess<C, O>,
        priority: i64,
        on_done: Option<Callback<O>>,
    ) -> bool {
        let id = process.process_id().clone();
        if self.registered.contains(&id) {
            debug!(process = %id, "rejected duplicate registration");
            return false;
        }
        if process.ram_requirement() > self.ram.capacity() {
            warn!(
                process = %id,
                required = process.ram_requirement(),
                capacity = self.ram.capacity(),
                "process can never fit in RAM"
            );
            return false;
        }

        self.registered.insert(id.clone());
        if let Some(callback) = on_done {
            self.callbacks.insert(id, callback);
        }
        self.queue.add_item(process, priority);
        self.admit();
        true
    }

    /// Stop a process immediately, wherever it is.
    ///
    /// Releases its RAM, removes it from the queue, and clears the boost.
    /// The completion callback is dropped without being called.
    pub fn kill_process(&mut self, id: &ProcessId) -> bool {
        let mut found = false;

        if let Some(pos) = self.active.iter().position(|p| p.process_id() == id) {
            self.active.remove(pos);
            self.ram.deallocate(id);
            found = true;
        }
        if self.queue.remove_where(|p| p.process_id() == id).is_some() {
            found = true;
        }
        if self.boosted.as_ref() == Some(id) {
            self.boosted = None;
        }

        if found {
            self.registered.remove(id);
            self.callbacks.remove(id);
            debug!(process = %id, "killed");
            self.admit();
        }
        found
    }

    /// Kill every active and queued process.
    pub fn kill_all(&mut self) {
        for process in self.active.drain(..) {
            self.ram.deallocate(process.process_id());
        }
        self.queue.clear();
        self.callbacks.clear();
        self.registered.clear();
        self.boosted = None;
        debug!("killed all processes");
    }

    /// Give a registered process the extra boost lane.
    ///
    /// Replaces any previous boost. Returns `false` for unknown ids.
    pub fn boost(&mut self, id: &ProcessId) -> bool {
        if !self.registered.contains(id) {
            return false;
        }
        self.boosted = Some(id.clone());
        true
    }

    /// Remove the boost, if any.
    pub fn clear_boost(&mut self) {
        self.boosted = None;
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Run a single pulse on the current lane, then flip lanes.
    ///
    /// The boost lane is skipped while nothing is boosted.
    pub fn pulse(&mut self, ctx: &mut C) -> PulseReport {
        let lane = if self.boosted.is_some() {
            self.lane
        } else {
            Lane::Normal
        };
        self.lane = lane.next();
        self.pulses = self.pulses.saturating_add(1);

        let budget = self.slow_tick_budget;
        let mut finished = Vec::new();
        let mut ticked = 0usize;

        match lane {
            Lane::Normal => {
                for process in &mut self.active {
                    ticked = ticked.saturating_add(1);
                    if timed_tick(process.as_mut(), ctx, budget) {
                        finished.push(process.process_id().clone());
                    }
                }
            }
            Lane::Boost => {
                if let Some(id) = &self.boosted
                    && let Some(process) = self.active.iter_mut().find(|p| p.process_id() == id)
                {
                    ticked = 1;
                    if timed_tick(process.as_mut(), ctx, budget) {
                        finished.push(id.clone());
                    }
                }
            }
        }

        let retired = self.retire(finished);
        self.admit();

        PulseReport {
            lane,
            ticked,
            retired,
        }
    }

    /// Convert elapsed wall-clock time into pulses and run them.
    ///
    /// Returns the number of pulses run.
    pub fn advance(&mut self, elapsed: Duration, ctx: &mut C) -> u64 {
        let pulses = self.clock.pulses_for(elapsed);
        for _ in 0..pulses {
            self.pulse(ctx);
        }
        pulses
    }

    /// The pulse clock, for speed changes.
    pub fn clock_mut(&mut self) -> &mut PulseClock {
        &mut self.clock
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Maximum number of active processes.
    #[must_use]
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// Number of cores currently running a process.
    #[must_use]
    pub fn cores_in_use(&self) -> usize {
        self.active.len()
    }

    /// Ids of active processes, in admission order.
    pub fn active_processes(&self) -> impl Iterator<Item = &ProcessId> + '_ {
        self.active.iter().map(|p| p.process_id())
    }

    /// Ids of queued processes, in admission order.
    pub fn queued_processes(&self) -> impl Iterator<Item = &ProcessId> + '_ {
        self.queue.iter().map(|p| p.process_id())
    }

    /// Whether `id` is active or queued.
    #[must_use]
    pub fn is_registered(&self, id: &ProcessId) -> bool {
        self.registered.contains(id)
    }

    /// No active and no queued processes.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty() && self.queue.is_empty()
    }

    /// The RAM ledger.
    #[must_use]
    pub fn ram(&self) -> &ResourceManager<ProcessId> {
        &self.ram
    }

    /// The boosted process, if any.
    #[must_use]
    pub fn boosted(&self) -> Option<&ProcessId> {
        self.boosted.as_ref()
    }

    /// Total pulses run so far.
    #[must_use]
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    /// Admit from the queue while a core is free and the head fits in RAM.
    fn admit(&mut self) {
        while self.active.len() < self.cores {
            let Some(head) = self.queue.peek_next() else {
                break;
            };
            let id = head.process_id().clone();
            if !self.ram.allocate(id.clone(), head.ram_requirement()) {
                break;
            }
            if let Some(process) = self.queue.extract_next() {
                debug!(process = %id, "admitted");
                self.active.push(process);
            }
        }
    }

    /// Release resources of finished processes and fire their callbacks.
    fn retire(&mut self, finished: Vec<ProcessId>) -> Vec<ProcessId> {
        let mut retired = Vec::with_capacity(finished.len());
        for id in finished {
            let Some(pos) = self.active.iter().position(|p| p.process_id() == &id) else {
                continue;
            };
            let process = self.active.remove(pos);
            self.ram.deallocate(&id);
            self.registered.remove(&id);
            if self.boosted.as_ref() == Some(&id) {
                self.boosted = None;
            }

            let value = process.return_value();
            if let Some(callback) = self.callbacks.remove(&id) {
                callback(value);
            }
            debug!(process = %id, "retired");
            retired.push(id);
        }
        retired
    }
}

/// Tick once, warning if the tick overran the soft budget.
fn timed_tick<C, O>(
    process: &mut dyn Process<C, Output = O>,
    ctx: &mut C,
    budget: Duration,
) -> bool {
    let started = Instant::now();
    let done = process.tick(ctx);
    let elapsed = started.elapsed();
    if elapsed > budget {
        warn!(
            process = %process.process_id(),
            elapsed_us = elapsed.as_micros() as u64,
            budget_us = budget.as_micros() as u64,
            "slow tick"
        );
    }
    done
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Context shared by the test processes: a log of ticks.
    type TickLog = Vec<String>;

    struct Countdown {
        id: ProcessId,
        ram: u64,
        remaining: u32,
        ticks: u32,
    }

    impl Countdown {
        fn boxed(name: &str, ram: u64, ticks: u32) -> BoxedProcess<TickLog, u32> {
            Box::new(Self {
                id: ProcessId::new(name),
                ram,
                remaining: ticks,
                ticks: 0,
            })
        }
    }

    impl Process<TickLog> for Countdown {
        type Output = u32;

        fn process_id(&self) -> &ProcessId {
            &self.id
        }

        fn ram_requirement(&self) -> u64 {
            self.ram
        }

        fn tick(&mut self, log: &mut TickLog) -> bool {
            log.push(self.id.as_str().to_string());
            self.ticks = self.ticks.saturating_add(1);
            self.remaining = self.remaining.saturating_sub(1);
            self.remaining == 0
        }

        fn return_value(&self) -> u32 {
            self.ticks
        }
    }

    fn run_until_idle(cpu: &mut Scheduler<TickLog, u32>, log: &mut TickLog) {
        for _ in 0..1000 {
            if cpu.is_idle() {
                return;
            }
            cpu.pulse(log);
        }
    }

    #[test]
    fn admits_up_to_core_limit() {
        let mut cpu = Scheduler::with_capacity(2, 1000);
        assert!(cpu.add_process(Countdown::boxed("a", 10, 3), 0, None));
        assert!(cpu.add_process(Countdown::boxed("b", 10, 3), 0, None));
        assert!(cpu.add_process(Countdown::boxed("c", 10, 3), 0, None));

        assert_eq!(cpu.cores_in_use(), 2);
        assert_eq!(cpu.queued_processes().count(), 1);
        assert_eq!(cpu.ram().used(), 20);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut cpu = Scheduler::with_capacity(1, 1000);
        assert!(cpu.add_process(Countdown::boxed("a", 10, 3), 0, None));
        assert!(!cpu.add_process(Countdown::boxed("a", 10, 3), 0, None));
        assert_eq!(cpu.cores_in_use(), 1);
    }

    #[test]
    fn oversized_process_is_rejected() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        assert!(!cpu.add_process(Countdown::boxed("huge", 101, 1), 0, None));
        assert!(cpu.is_idle());
    }

    #[test]
    fn higher_priority_is_admitted_first_when_core_frees() {
        let mut cpu = Scheduler::with_capacity(1, 1000);
        let mut log = TickLog::new();
        cpu.add_process(Countdown::boxed("blocker", 1, 1), 0, None);
        cpu.add_process(Countdown::boxed("p1", 1, 1), 5, None);
        cpu.add_process(Countdown::boxed("p2", 1, 1), 9, None);

        run_until_idle(&mut cpu, &mut log);
        assert_eq!(log, vec!["blocker", "p2", "p1"]);
    }

    #[test]
    fn queue_head_that_does_not_fit_blocks_smaller_items() {
        let mut cpu = Scheduler::with_capacity(3, 100);
        cpu.add_process(Countdown::boxed("resident", 60, 5), 9, None);
        cpu.add_process(Countdown::boxed("big", 50, 1), 5, None);
        cpu.add_process(Countdown::boxed("small", 10, 1), 1, None);

        // "small" would fit but sits behind "big".
        assert_eq!(cpu.active_processes().count(), 1);
        assert_eq!(
            cpu.queued_processes().map(|id| id.as_str()).collect::<Vec<_>>(),
            vec!["big", "small"]
        );
    }

    #[test]
    fn retirement_fires_callback_and_frees_resources() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        let mut log = TickLog::new();
        let result = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&result);

        cpu.add_process(
            Countdown::boxed("job", 40, 2),
            0,
            Some(Box::new(move |ticks: u32| *sink.borrow_mut() = Some(ticks))),
        );
        cpu.add_process(Countdown::boxed("next", 80, 1), 0, None);
        assert_eq!(cpu.cores_in_use(), 1);

        let first = cpu.pulse(&mut log);
        assert!(first.retired.is_empty());
        let second = cpu.pulse(&mut log);

        assert_eq!(second.retired, vec![ProcessId::new("job")]);
        assert_eq!(*result.borrow(), Some(2));
        assert_eq!(
            cpu.active_processes().collect::<Vec<_>>(),
            vec![&ProcessId::new("next")]
        );
        assert_eq!(cpu.ram().used(), 80);
    }

    #[test]
    fn kill_releases_without_callback() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);

        cpu.add_process(
            Countdown::boxed("victim", 50, 10),
            0,
            Some(Box::new(move |_: u32| *flag.borrow_mut() = true)),
        );
        cpu.add_process(Countdown::boxed("waiting", 50, 10), 0, None);
        cpu.boost(&ProcessId::new("victim"));

        assert!(cpu.kill_process(&ProcessId::new("victim")));
        assert!(!*called.borrow());
        assert_eq!(cpu.boosted(), None);
        assert_eq!(
            cpu.active_processes().collect::<Vec<_>>(),
            vec![&ProcessId::new("waiting")]
        );
        assert!(!cpu.kill_process(&ProcessId::new("victim")));
    }

    #[test]
    fn killing_queued_process_removes_it() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        cpu.add_process(Countdown::boxed("a", 10, 10), 0, None);
        cpu.add_process(Countdown::boxed("b", 10, 10), 0, None);

        assert!(cpu.kill_process(&ProcessId::new("b")));
        assert_eq!(cpu.queued_processes().count(), 0);
        // The id may be reused once it is gone.
        assert!(cpu.add_process(Countdown::boxed("b", 10, 10), 0, None));
    }

    #[test]
    fn boosted_process_gets_extra_lane() {
        let mut cpu = Scheduler::with_capacity(2, 100);
        let mut log = TickLog::new();
        cpu.add_process(Countdown::boxed("plain", 1, 100), 0, None);
        cpu.add_process(Countdown::boxed("fast", 1, 100), 0, None);
        assert!(cpu.boost(&ProcessId::new("fast")));

        for _ in 0..10 {
            cpu.pulse(&mut log);
        }

        let fast = log.iter().filter(|s| *s == "fast").count();
        let plain = log.iter().filter(|s| *s == "plain").count();
        assert_eq!(plain, 5);
        assert_eq!(fast, 10);
    }

    #[test]
    fn advance_runs_owed_pulses() {
        let mut cpu: Scheduler<TickLog, u32> = Scheduler::new(&SchedulerConfig {
            cores: 1,
            ram: 10,
            pulses_per_second: 10,
            speed_percent: 100,
            slow_tick_ms: 5,
        });
        let mut log = TickLog::new();
        cpu.add_process(Countdown::boxed("a", 1, 100), 0, None);

        let pulses = cpu.advance(Duration::from_millis(400), &mut log);
        assert_eq!(pulses, 4);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn unboosted_pulses_stay_on_normal_lane() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        let mut log = TickLog::new();
        cpu.add_process(Countdown::boxed("a", 1, 100), 0, None);

        for _ in 0..3 {
            let report = cpu.pulse(&mut log);
            assert_eq!(report.lane, Lane::Normal);
            assert_eq!(report.ticked, 1);
        }

        assert!(cpu.boost(&ProcessId::new("a")));
        assert_eq!(cpu.pulse(&mut log).lane, Lane::Boost);
        assert_eq!(cpu.pulse(&mut log).lane, Lane::Normal);
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn kill_all_resets_everything() {
        let mut cpu = Scheduler::with_capacity(1, 100);
        cpu.add_process(Countdown::boxed("a", 10, 10), 0, None);
        cpu.add_process(Countdown::boxed("b", 10, 10), 0, None);
        cpu.kill_all();

        assert!(cpu.is_idle());
        assert_eq!(cpu.ram().used(), 0);
    }
}
