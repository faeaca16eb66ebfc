//! Cumulative search counters.
//!
//! Single-threaded by contract; counters are `Cell`s so the statistics can
//! be shared between the engine and short-lived evaluation contexts without
//! borrow gymnastics.

use std::cell::Cell;

use tracing::info;

/// Counters accumulated over one search (or, for iterated search, over all
/// phases).
#[derive(Debug, Default)]
pub struct SearchStatistics {
    expanded: Cell<u64>,
    evaluated_states: Cell<u64>,
    evaluations: Cell<u64>,
    generated: Cell<u64>,
    reopened: Cell<u64>,
    dead_ends: Cell<u64>,
    /// Highest f-value a progress line was printed for.
    lastjump_f_value: Cell<i32>,
}

impl SearchStatistics {
    #[must_use]
    pub fn new() -> Self {
        let stats = Self::default();
        stats.lastjump_f_value.set(-1);
        stats
    }

    pub fn inc_expanded(&self) {
        self.expanded.set(self.expanded.get() + 1);
    }

    pub fn inc_evaluated_states(&self) {
        self.evaluated_states.set(self.evaluated_states.get() + 1);
    }

    pub fn inc_evaluations(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }

    pub fn inc_generated(&self) {
        self.generated.set(self.generated.get() + 1);
    }

    pub fn inc_reopened(&self) {
        self.reopened.set(self.reopened.get() + 1);
    }

    pub fn inc_dead_ends(&self) {
        self.dead_ends.set(self.dead_ends.get() + 1);
    }

    #[must_use]
    pub fn expanded(&self) -> u64 {
        self.expanded.get()
    }

    #[must_use]
    pub fn evaluated_states(&self) -> u64 {
        self.evaluated_states.get()
    }

    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    #[must_use]
    pub fn generated(&self) -> u64 {
        self.generated.get()
    }

    #[must_use]
    pub fn reopened(&self) -> u64 {
        self.reopened.get()
    }

    #[must_use]
    pub fn dead_ends(&self) -> u64 {
        self.dead_ends.get()
    }

    /// Fold another phase's counters into this one (iterated search).
    pub fn accumulate(&self, other: &SearchStatistics) {
        self.expanded.set(self.expanded.get() + other.expanded());
        self.evaluated_states
            .set(self.evaluated_states.get() + other.evaluated_states());
        self.evaluations
            .set(self.evaluations.get() + other.evaluations());
        self.generated.set(self.generated.get() + other.generated());
        self.reopened.set(self.reopened.get() + other.reopened());
        self.dead_ends.set(self.dead_ends.get() + other.dead_ends());
    }

    /// Print an `f = N` line whenever the tracked f-value jumps to a new
    /// maximum.
    pub fn report_f_value_progress(&self, f: i32) {
        if f > self.lastjump_f_value.get() {
            self.lastjump_f_value.set(f);
            info!(
                "f = {f} [{} evaluated, {} expanded]",
                self.evaluated_states.get(),
                self.expanded.get()
            );
        }
    }

    /// Print a checkpoint line after a best-h improvement.
    pub fn print_checkpoint_line(&self, g: i32) {
        info!(
            "g = {g} [{} evaluated, {} expanded]",
            self.evaluated_states.get(),
            self.expanded.get()
        );
    }

    pub fn print_detailed(&self) {
        info!("Expanded {} state(s).", self.expanded.get());
        info!("Reopened {} state(s).", self.reopened.get());
        info!("Evaluated {} state(s).", self.evaluated_states.get());
        info!("Evaluations: {}", self.evaluations.get());
        info!("Generated {} state(s).", self.generated.get());
        info!("Dead ends: {} state(s).", self.dead_ends.get());
    }
}
