//! Foray Search: eager best-first graph search over planning tasks.
//!
//! This crate provides the search layer. It depends only on `foray_task` —
//! it does NOT depend on `foray_driver`.
//!
//! # Crate dependency graph
//!
//! ```text
//! foray_task  ←  foray_search  ←  foray_driver
//! (task model)   (engine, open lists)  (grammar, plan files)
//! ```
//!
//! # Key types
//!
//! - [`state_registry::StateRegistry`] — state interning with dense ids
//! - [`search_space::SearchSpace`] — per-state node records and the status machine
//! - [`evaluator::Evaluator`] — the composable evaluator DAG (`Rc`-shared)
//! - [`open_list::OpenList`] — best-first, tie-breaking, and alternation lists
//! - [`eager::EagerSearch`] — the main exploration loop
//! - [`iterated::IteratedSearch`] — the iteration protocol over engine factories
//! - [`component::ComponentMap`] — task binding with structural sharing

#![forbid(unsafe_code)]

pub mod component;
pub mod cost;
pub mod eager;
pub mod engine;
pub mod error;
pub mod evaluation_context;
pub mod evaluation_result;
pub mod evaluator;
pub mod evaluators;
pub mod heuristics;
pub mod iterated;
pub mod open_list;
pub mod open_lists;
pub mod progress;
pub mod pruning;
pub mod search_space;
pub mod state_registry;
pub mod statistics;
