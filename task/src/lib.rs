//! Foray Task: the planning-task model.
//!
//! This crate defines the STRIPS-like task representation consumed by the
//! search layer: multi-valued state variables, operators with conditional
//! effects and costs, axioms for derived variables, and the line-delimited
//! task reader.
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
//! - [`fact::FactPair`] — a `(variable, value)` pair
//! - [`task::PlanningTask`] — the immutable task: variables, operators, axioms, goal
//! - [`task::OperatorId`] — dense operator identifier
//! - [`axioms::AxiomEvaluator`] — layered fixpoint evaluation of derived variables
//! - [`successor::SuccessorGenerator`] — deterministic applicable-operator enumeration
//! - [`parse`] — the stdin task grammar

#![forbid(unsafe_code)]

pub mod axioms;
pub mod fact;
pub mod parse;
pub mod successor;
pub mod task;
