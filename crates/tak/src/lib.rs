//! # Tak - Variables and Domains for Branch-and-Bound Optimization
//!
//! Tak provides the variable layer of a branch-and-bound solver for mixed-integer
//! linear optimization problems. A [`Problem`] owns all variables of both the
//! original formulation and its transformed (presolved) form, and keeps track
//! of:
//!
//! - the status of every variable (original, active, fixed, aggregated,
//!   multi-aggregated or negated) and the affine relations between them,
//! - the global and local domains of variables, together with the history of
//!   local bound changes and their justifications,
//! - the logs of the domain changes made at the nodes of the search tree, which
//!   can be undone and applied again when the search moves through the tree,
//! - the variable bounds, implications and cliques that relate variables, and
//! - rounding locks, objective coefficients and branching statistics.
//!
//! Infeasibility is not an error: operations that detect it report it as part
//! of their outcome. A [`VarError`] is returned only when an operation is
//! requested that is not supported for a variable.

pub mod actions;
pub(crate) mod clique;
pub(crate) mod config;
pub(crate) mod domain;
pub(crate) mod domchg;
pub(crate) mod event;
pub(crate) mod helpers;
pub(crate) mod history;
pub(crate) mod implication;
pub(crate) mod problem;
pub(crate) mod statistics;
pub(crate) mod var;

pub use crate::{
	clique::{Clique, CliqueRef},
	config::Config,
	domain::{Domain, Hole, Holelist},
	domchg::{BoundChg, DomChg, HoleChg},
	event::VarEvent,
	history::{BdChgIdx, BoundChangeInfo, BoundChangeKind, BoundReason, ConsRef, PropRef},
	implication::{Implication, Implications, VarBound, VarBounds},
	problem::{
		bounds::Tightening,
		graph::Derivation,
		resolve::Literal,
		transition::{AggregationOutcome, FixOutcome},
		Problem, VarError,
	},
	statistics::{BranchHistory, Statistics},
	var::{BoundType, BranchDirection, Column, LockType, Status, VarRef, VarType, Variable},
};
