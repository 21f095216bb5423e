//! Statistics collected while solving, kept in an explicit context object that
//! is owned by a [`crate::Problem`].
//!
//! Branching statistics are kept twice: once accumulated over all runs, and
//! once for the current run only. Starting a new run (e.g. after a restart)
//! resets the latter.

use crate::BranchDirection;

#[derive(Debug, Clone, Default, PartialEq)]
/// Branching statistics of a single variable, or aggregated over all
/// variables.
pub struct BranchHistory {
	/// Weighted sum of the objective gain per unit change, per direction (down,
	/// up).
	pscost_sum: [f64; 2],
	/// Sum of the weights of the pseudo-cost observations, per direction.
	pscost_count: [f64; 2],
	/// Conflict scores, per direction.
	conflict_score: [f64; 2],
	/// Number of branchings, per direction.
	n_branchings: [u64; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Counters and aggregated statistics of a [`crate::Problem`].
pub struct Statistics {
	/// Branching statistics over all variables and all runs.
	pub(crate) history: BranchHistory,
	/// Branching statistics over all variables in the current run.
	pub(crate) history_run: BranchHistory,
	/// The number of started runs.
	pub(crate) n_runs: u32,
	/// The number of variables fixed.
	pub(crate) n_fixings: u64,
	/// The number of variables aggregated.
	pub(crate) n_aggregations: u64,
	/// The number of variables multi-aggregated.
	pub(crate) n_multi_aggregations: u64,
	/// The number of negated variables created.
	pub(crate) n_negations: u64,
	/// The number of committed global bound changes.
	pub(crate) n_global_bound_changes: u64,
	/// The number of committed local bound changes.
	pub(crate) n_local_bound_changes: u64,
	/// The number of implications added.
	pub(crate) n_implications: u64,
	/// The number of cliques added.
	pub(crate) n_cliques: u64,
}

impl BranchHistory {
	/// Internal method mapping a direction to the indices it contributes to.
	fn directions(dir: BranchDirection) -> &'static [usize] {
		match dir {
			BranchDirection::Downwards => &[0],
			BranchDirection::Upwards => &[1],
			BranchDirection::Auto => &[0, 1],
		}
	}

	/// Record an observed objective change `obj_delta` caused by changing the
	/// value of the variable by `sol_delta`.
	pub(crate) fn update_pseudocost(&mut self, sol_delta: f64, obj_delta: f64, weight: f64) {
		let dir = usize::from(sol_delta >= 0.0);
		let distance = sol_delta.abs().max(1e-6);
		self.pscost_sum[dir] += weight * obj_delta / distance;
		self.pscost_count[dir] += weight;
	}

	/// The expected objective change when changing the value of the variable by
	/// `sol_delta`, if any observations were made in that direction.
	pub fn pseudocost(&self, sol_delta: f64) -> Option<f64> {
		let dir = usize::from(sol_delta >= 0.0);
		if self.pscost_count[dir] > 0.0 {
			Some(self.pscost_sum[dir] / self.pscost_count[dir] * sol_delta.abs())
		} else {
			None
		}
	}

	/// The total weight of the pseudo-cost observations in the given direction.
	pub fn pseudocost_count(&self, dir: BranchDirection) -> f64 {
		Self::directions(dir)
			.iter()
			.map(|&d| self.pscost_count[d])
			.sum()
	}

	/// Increase the conflict score in the given direction. [`BranchDirection::Auto`]
	/// splits the score over both directions.
	pub(crate) fn inc_conflict_score(&mut self, dir: BranchDirection, score: f64) {
		let dirs = Self::directions(dir);
		for &d in dirs {
			self.conflict_score[d] += score / dirs.len() as f64;
		}
	}

	/// The conflict score in the given direction (both directions summed for
	/// [`BranchDirection::Auto`]).
	pub fn conflict_score(&self, dir: BranchDirection) -> f64 {
		Self::directions(dir)
			.iter()
			.map(|&d| self.conflict_score[d])
			.sum()
	}

	/// Record a branching in the given direction.
	pub(crate) fn inc_branchings(&mut self, dir: BranchDirection) {
		for &d in Self::directions(dir) {
			self.n_branchings[d] += 1;
		}
	}

	/// The number of branchings in the given direction.
	pub fn n_branchings(&self, dir: BranchDirection) -> u64 {
		Self::directions(dir)
			.iter()
			.map(|&d| self.n_branchings[d])
			.sum()
	}

	/// Merge the statistics of another history into this one.
	pub(crate) fn merge(&mut self, other: &BranchHistory) {
		for d in 0..2 {
			self.pscost_sum[d] += other.pscost_sum[d];
			self.pscost_count[d] += other.pscost_count[d];
			self.conflict_score[d] += other.conflict_score[d];
			self.n_branchings[d] += other.n_branchings[d];
		}
	}

	/// Returns the history with both directions exchanged.
	pub(crate) fn flipped(&self) -> Self {
		Self {
			pscost_sum: [self.pscost_sum[1], self.pscost_sum[0]],
			pscost_count: [self.pscost_count[1], self.pscost_count[0]],
			conflict_score: [self.conflict_score[1], self.conflict_score[0]],
			n_branchings: [self.n_branchings[1], self.n_branchings[0]],
		}
	}
}

impl Statistics {
	/// Branching statistics over all variables and all runs.
	pub fn history(&self) -> &BranchHistory {
		&self.history
	}

	/// Branching statistics over all variables in the current run.
	pub fn history_run(&self) -> &BranchHistory {
		&self.history_run
	}

	/// The number of started runs.
	pub fn n_runs(&self) -> u32 {
		self.n_runs
	}

	/// The number of variables fixed.
	pub fn n_fixings(&self) -> u64 {
		self.n_fixings
	}

	/// The number of variables aggregated.
	pub fn n_aggregations(&self) -> u64 {
		self.n_aggregations
	}

	/// The number of variables multi-aggregated.
	pub fn n_multi_aggregations(&self) -> u64 {
		self.n_multi_aggregations
	}

	/// The number of negated variables created.
	pub fn n_negations(&self) -> u64 {
		self.n_negations
	}

	/// The number of committed global bound changes.
	pub fn n_global_bound_changes(&self) -> u64 {
		self.n_global_bound_changes
	}

	/// The number of committed local bound changes.
	pub fn n_local_bound_changes(&self) -> u64 {
		self.n_local_bound_changes
	}

	/// The number of implications added.
	pub fn n_implications(&self) -> u64 {
		self.n_implications
	}

	/// The number of cliques added.
	pub fn n_cliques(&self) -> u64 {
		self.n_cliques
	}
}
