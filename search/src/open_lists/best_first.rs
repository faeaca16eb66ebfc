//! Bucketed best-first open list over a single evaluator.
//!
//! Entries with the same evaluator value share a double-ended queue
//! ("bucket"); the bucket store is a `BTreeMap` from value to queue, so
//! insertion and removal cost O(log B) in the number of distinct values.
//! Removal takes the front of the lowest bucket (FIFO tie-breaking) and
//! erases the bucket when it empties.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::evaluation_context::EvaluationContext;
use crate::evaluator::{collect_path_dependent, Evaluator, PathDependentSet};

#[derive(Debug)]
pub struct BestFirstOpenList<E> {
    evaluator: Rc<Evaluator>,
    /// When set, entries not reached via a preferred operator are dropped
    /// on insertion.
    pref_only: bool,
    buckets: BTreeMap<i32, VecDeque<E>>,
    size: usize,
}

impl<E> BestFirstOpenList<E> {
    #[must_use]
    pub fn new(evaluator: Rc<Evaluator>, pref_only: bool) -> Self {
        Self {
            evaluator,
            pref_only,
            buckets: BTreeMap::new(),
            size: 0,
        }
    }

    pub fn insert(&mut self, ctx: &mut EvaluationContext, entry: E) {
        if self.pref_only && !ctx.is_preferred() {
            return;
        }
        if self.is_dead_end(ctx) {
            return;
        }
        let key = ctx.value(&self.evaluator);
        self.buckets.entry(key).or_default().push_back(entry);
        self.size += 1;
    }

    pub fn pop(&mut self) -> Option<E> {
        let mut first = self.buckets.first_entry()?;
        let bucket = first.get_mut();
        let entry = bucket.pop_front();
        debug_assert!(entry.is_some(), "buckets are erased when they empty");
        if bucket.is_empty() {
            first.remove();
        }
        self.size -= 1;
        entry
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }

    #[must_use]
    pub fn only_contains_preferred_entries(&self) -> bool {
        self.pref_only
    }

    pub fn is_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        ctx.is_infinite(&self.evaluator)
    }

    pub fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        self.is_dead_end(ctx) && self.evaluator.dead_ends_are_reliable()
    }

    pub fn collect_path_dependent(&self, set: &mut PathDependentSet) {
        collect_path_dependent(&self.evaluator, set);
    }
}
