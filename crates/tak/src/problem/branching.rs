//! Branching statistics of variables: pseudo-costs, conflict scores and
//! branching counts.
//!
//! Statistics are always recorded on the variable that represents a variable,
//! mapping the direction (and the size of a value change) through the affine
//! relation between them. Every update is also added to the global statistics
//! of the problem.

use tracing::trace;

use crate::{
	helpers::linear_transform::LinearTransform, statistics::BranchHistory, var::VarStatus,
	BranchDirection, Problem, VarError, VarRef,
};

impl Problem {
	/// Record that changing the value of `var` by `sol_delta` in the linear
	/// relaxation changed the objective value by `obj_delta`.
	pub fn update_pseudocost(
		&mut self,
		var: VarRef,
		sol_delta: f64,
		obj_delta: f64,
		weight: f64,
	) -> Result<(), VarError> {
		let (y, t) = self.branching_representative(var, "pseudo-cost updates")?;
		let delta = sol_delta / t.scale;
		trace!(var = %self.vars[y].name, delta, obj_delta, weight, "update pseudo-cost");
		self.update_histories(y, |h| h.update_pseudocost(delta, obj_delta, weight));
		Ok(())
	}

	/// The expected objective change when changing the value of `var` by
	/// `sol_delta`.
	///
	/// Without observations for the variable, the global pseudo-cost is used;
	/// without any observations, a unit cost per unit change is assumed.
	pub fn pseudocost(&self, var: VarRef, sol_delta: f64) -> f64 {
		let (y, t) = self.resolve(var);
		let delta = sol_delta / t.scale;
		self.vars[y]
			.branching
			.pseudocost(delta)
			.or_else(|| self.stats.history.pseudocost(delta))
			.unwrap_or(delta.abs())
	}

	/// The expected objective change in the current run when changing the
	/// value of `var` by `sol_delta`, with the same fallbacks as
	/// [`Self::pseudocost`].
	pub fn pseudocost_run(&self, var: VarRef, sol_delta: f64) -> f64 {
		let (y, t) = self.resolve(var);
		let delta = sol_delta / t.scale;
		self.vars[y]
			.branching_run
			.pseudocost(delta)
			.or_else(|| self.stats.history_run.pseudocost(delta))
			.unwrap_or(delta.abs())
	}

	/// The total weight of the pseudo-cost observations of `var` in the given
	/// direction.
	pub fn pseudocost_count(&self, var: VarRef, dir: BranchDirection) -> f64 {
		let (y, t) = self.resolve(var);
		self.vars[y]
			.branching
			.pseudocost_count(Self::map_direction(dir, &t))
	}

	/// Increase the conflict score of `var` in the given direction.
	pub fn inc_conflict_score(
		&mut self,
		var: VarRef,
		dir: BranchDirection,
		score: f64,
	) -> Result<(), VarError> {
		let (y, t) = self.branching_representative(var, "conflict score updates")?;
		let dir = Self::map_direction(dir, &t);
		self.update_histories(y, |h| h.inc_conflict_score(dir, score));
		Ok(())
	}

	/// The conflict score of `var` in the given direction.
	pub fn conflict_score(&self, var: VarRef, dir: BranchDirection) -> f64 {
		let (y, t) = self.resolve(var);
		self.vars[y]
			.branching
			.conflict_score(Self::map_direction(dir, &t))
	}

	/// Record a branching on `var` in the given direction.
	pub fn inc_branchings(&mut self, var: VarRef, dir: BranchDirection) -> Result<(), VarError> {
		let (y, t) = self.branching_representative(var, "branching counts")?;
		let dir = Self::map_direction(dir, &t);
		self.update_histories(y, |h| h.inc_branchings(dir));
		Ok(())
	}

	/// The number of branchings on `var` in the given direction.
	pub fn n_branchings(&self, var: VarRef, dir: BranchDirection) -> u64 {
		let (y, t) = self.resolve(var);
		self.vars[y]
			.branching
			.n_branchings(Self::map_direction(dir, &t))
	}

	/// Start a new run, resetting the branching statistics of the current run.
	pub fn new_run(&mut self) {
		self.stats.n_runs += 1;
		self.stats.history_run = BranchHistory::default();
		for x in self.vars.iter_mut() {
			x.branching_run = BranchHistory::default();
		}
		trace!(run = self.stats.n_runs, "start new run");
	}

	/// Internal method to resolve a variable to the variable on which its
	/// branching statistics are recorded.
	fn branching_representative(
		&self,
		var: VarRef,
		operation: &'static str,
	) -> Result<(VarRef, LinearTransform), VarError> {
		self.check_alive(var)?;
		let (y, t) = self.resolve(var);
		match self.vars[y].status {
			VarStatus::Loose | VarStatus::Column(_) | VarStatus::Original { transformed: None } => {
				Ok((y, t))
			}
			_ => Err(self.invalid_status(y, operation)),
		}
	}

	/// Internal method to apply an update to the branching statistics of a
	/// variable and to the global statistics, both for the current run and over
	/// all runs.
	fn update_histories(&mut self, var: VarRef, update: impl Fn(&mut BranchHistory)) {
		let x = &mut self.vars[var];
		update(&mut x.branching);
		update(&mut x.branching_run);
		update(&mut self.stats.history);
		update(&mut self.stats.history_run);
	}

	/// Internal method to map a branching direction on a variable to the
	/// direction on its representative.
	fn map_direction(dir: BranchDirection, transform: &LinearTransform) -> BranchDirection {
		if transform.positive_scale() {
			dir
		} else {
			!dir
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::{BranchDirection, Problem, VarError, VarType};

	#[test]
	fn test_pseudocost_through_negation() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let nx = prb.negate(x).unwrap();
		// without observations, a unit cost is assumed
		assert_eq!(prb.pseudocost(x, 0.5), 0.5);

		// decreasing ~x increases x
		prb.update_pseudocost(nx, -0.5, 2.0, 1.0).unwrap();
		assert_eq!(prb.pseudocost(x, 1.0), 4.0);
		assert_eq!(prb.pseudocost(nx, -1.0), 4.0);
		assert_eq!(prb.pseudocost_count(x, BranchDirection::Upwards), 1.0);
		// y falls back to the global pseudo-cost
		assert_eq!(prb.pseudocost(y, 0.25), 1.0);
		assert_eq!(prb.pseudocost(y, -1.0), 1.0);
	}

	#[test]
	fn test_conflict_scores_and_runs() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let nx = prb.negate(x).unwrap();
		prb.inc_conflict_score(nx, BranchDirection::Upwards, 2.0)
			.unwrap();
		prb.inc_branchings(x, BranchDirection::Upwards).unwrap();
		assert_eq!(prb.conflict_score(x, BranchDirection::Downwards), 2.0);
		assert_eq!(prb.n_branchings(nx, BranchDirection::Downwards), 1);
		assert_eq!(
			prb.statistics()
				.history()
				.conflict_score(BranchDirection::Auto),
			2.0
		);

		prb.update_pseudocost(x, 1.0, 3.0, 1.0).unwrap();
		prb.new_run();
		assert_eq!(prb.statistics().n_runs(), 1);
		assert_eq!(prb.pseudocost_run(x, 1.0), 1.0);
		assert_eq!(prb.pseudocost(x, 1.0), 3.0);
		assert_eq!(
			prb.var(x)
				.branching_history_run()
				.conflict_score(BranchDirection::Auto),
			0.0
		);

		let a = prb.add_var("a", VarType::Continuous, 0.0, 5.0, 0.0);
		let b = prb.add_var("b", VarType::Continuous, 0.0, 5.0, 0.0);
		let m = prb.add_var("m", VarType::Continuous, 0.0, 10.0, 0.0);
		let _ = prb.multi_aggregate(m, &[(a, 1.0), (b, 1.0)], 0.0).unwrap();
		assert!(matches!(
			prb.update_pseudocost(m, 1.0, 1.0, 1.0),
			Err(VarError::InvalidStatus { .. })
		));
	}
}
