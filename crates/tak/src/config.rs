//! Numerical settings and limits that govern how variable domains are
//! compared, rounded and tightened.

#[derive(Debug, Clone, Default, PartialEq)]
/// Configuration object for a [`crate::Problem`].
///
/// All numerical comparisons performed on bounds go through the methods of
/// this object, so that every operation agrees on what counts as "equal",
/// "integral" or "infinite".
pub struct Config {
	/// Absolute tolerance used when comparing values for (in)equality.
	epsilon: Option<f64>,
	/// Feasibility tolerance used when deciding whether a bound or value
	/// violates a domain.
	feastol: Option<f64>,
	/// Values with a magnitude at or beyond this threshold are treated as
	/// infinite.
	infinity: Option<f64>,
	/// The maximum number of passes used to compute the transitive closure of a
	/// new implication.
	max_closure_depth: Option<usize>,
	/// The maximum number of implications that may be derived transitively from
	/// a single new implication.
	max_closure_edges: Option<usize>,
	/// The maximum number of rounds used to tighten the bounds of two variables
	/// that are about to be aggregated.
	max_aggregation_rounds: Option<usize>,
}

impl Config {
	/// The default absolute tolerance for equality comparisons.
	pub const DEFAULT_EPSILON: f64 = 1e-9;
	/// The default feasibility tolerance.
	pub const DEFAULT_FEASTOL: f64 = 1e-6;
	/// The default threshold at which values are considered infinite.
	pub const DEFAULT_INFINITY: f64 = 1e20;
	/// The default number of implication closure passes.
	pub const DEFAULT_MAX_CLOSURE_DEPTH: usize = 2;
	/// The default number of transitively derived implications per request.
	pub const DEFAULT_MAX_CLOSURE_EDGES: usize = 64;
	/// The default number of aggregation bound tightening rounds.
	pub const DEFAULT_MAX_AGGREGATION_ROUNDS: usize = 16;

	/// Get the absolute tolerance used for equality comparisons.
	pub fn epsilon(&self) -> f64 {
		self.epsilon.unwrap_or(Self::DEFAULT_EPSILON)
	}

	/// Get the feasibility tolerance.
	pub fn feastol(&self) -> f64 {
		self.feastol.unwrap_or(Self::DEFAULT_FEASTOL)
	}

	/// Get the threshold at which values are considered infinite.
	pub fn infinity(&self) -> f64 {
		self.infinity.unwrap_or(Self::DEFAULT_INFINITY)
	}

	/// Get the maximum number of passes used when computing the transitive
	/// closure of an implication.
	pub fn max_closure_depth(&self) -> usize {
		self.max_closure_depth
			.unwrap_or(Self::DEFAULT_MAX_CLOSURE_DEPTH)
	}

	/// Get the maximum number of implications derived transitively from a single
	/// request.
	pub fn max_closure_edges(&self) -> usize {
		self.max_closure_edges
			.unwrap_or(Self::DEFAULT_MAX_CLOSURE_EDGES)
	}

	/// Get the maximum number of rounds of bound tightening performed before an
	/// aggregation.
	pub fn max_aggregation_rounds(&self) -> usize {
		self.max_aggregation_rounds
			.unwrap_or(Self::DEFAULT_MAX_AGGREGATION_ROUNDS)
	}

	/// Change the absolute tolerance used for equality comparisons.
	pub fn with_epsilon(mut self, epsilon: f64) -> Self {
		self.epsilon = Some(epsilon);
		self
	}

	/// Change the feasibility tolerance.
	pub fn with_feastol(mut self, feastol: f64) -> Self {
		self.feastol = Some(feastol);
		self
	}

	/// Change the threshold at which values are considered infinite.
	pub fn with_infinity(mut self, infinity: f64) -> Self {
		self.infinity = Some(infinity);
		self
	}

	/// Change the maximum number of implication closure passes.
	pub fn with_max_closure_depth(mut self, depth: usize) -> Self {
		self.max_closure_depth = Some(depth);
		self
	}

	/// Change the maximum number of transitively derived implications.
	pub fn with_max_closure_edges(mut self, edges: usize) -> Self {
		self.max_closure_edges = Some(edges);
		self
	}

	/// Change the maximum number of aggregation bound tightening rounds.
	pub fn with_max_aggregation_rounds(mut self, rounds: usize) -> Self {
		self.max_aggregation_rounds = Some(rounds);
		self
	}

	/// Normalise a value so that values beyond the infinity threshold are
	/// represented as [`f64::INFINITY`] or [`f64::NEG_INFINITY`].
	pub fn normalize(&self, val: f64) -> f64 {
		if val >= self.infinity() {
			f64::INFINITY
		} else if val <= -self.infinity() {
			f64::NEG_INFINITY
		} else {
			val
		}
	}

	/// Returns whether the value is considered (positive) infinite.
	pub fn is_infinity(&self, val: f64) -> bool {
		val >= self.infinity()
	}

	/// Returns whether the value is considered negative infinite.
	pub fn is_neg_infinity(&self, val: f64) -> bool {
		val <= -self.infinity()
	}

	/// Returns whether the value is finite according to the infinity threshold.
	pub fn is_finite(&self, val: f64) -> bool {
		!self.is_infinity(val) && !self.is_neg_infinity(val)
	}

	/// Returns whether `a` and `b` are equal within [`Self::epsilon`].
	pub fn is_eq(&self, a: f64, b: f64) -> bool {
		if a == b {
			return true;
		}
		if !self.is_finite(a) || !self.is_finite(b) {
			return false;
		}
		(a - b).abs() <= self.epsilon()
	}

	/// Returns whether `a` is strictly greater than `b` beyond
	/// [`Self::epsilon`].
	pub fn is_gt(&self, a: f64, b: f64) -> bool {
		a > b && !self.is_eq(a, b)
	}

	/// Returns whether `a` is strictly less than `b` beyond [`Self::epsilon`].
	pub fn is_lt(&self, a: f64, b: f64) -> bool {
		self.is_gt(b, a)
	}

	/// Returns whether `a` is at most `b` within [`Self::epsilon`].
	pub fn is_le(&self, a: f64, b: f64) -> bool {
		!self.is_gt(a, b)
	}

	/// Returns whether `a` is at least `b` within [`Self::epsilon`].
	pub fn is_ge(&self, a: f64, b: f64) -> bool {
		!self.is_lt(a, b)
	}

	/// Returns whether the value is (within [`Self::epsilon`]) zero.
	pub fn is_zero(&self, val: f64) -> bool {
		val.abs() <= self.epsilon()
	}

	/// Returns whether `a` and `b` are equal within [`Self::feastol`].
	pub fn is_feas_eq(&self, a: f64, b: f64) -> bool {
		if a == b {
			return true;
		}
		if !self.is_finite(a) || !self.is_finite(b) {
			return false;
		}
		(a - b).abs() <= self.feastol()
	}

	/// Returns whether `a` is strictly greater than `b` beyond
	/// [`Self::feastol`].
	pub fn is_feas_gt(&self, a: f64, b: f64) -> bool {
		a > b && !self.is_feas_eq(a, b)
	}

	/// Returns whether `a` is strictly less than `b` beyond [`Self::feastol`].
	pub fn is_feas_lt(&self, a: f64, b: f64) -> bool {
		self.is_feas_gt(b, a)
	}

	/// Returns whether the value is integral within [`Self::feastol`].
	pub fn is_feas_integral(&self, val: f64) -> bool {
		!self.is_finite(val) || (val - val.round()).abs() <= self.feastol()
	}

	/// Round up a value, treating values within [`Self::feastol`] of an integer
	/// as that integer.
	pub fn feas_ceil(&self, val: f64) -> f64 {
		if self.is_finite(val) {
			(val - self.feastol()).ceil()
		} else {
			val
		}
	}

	/// Round down a value, treating values within [`Self::feastol`] of an
	/// integer as that integer.
	pub fn feas_floor(&self, val: f64) -> f64 {
		if self.is_finite(val) {
			(val + self.feastol()).floor()
		} else {
			val
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::Config;

	#[test]
	fn test_defaults_and_builder() {
		let config = Config::default();
		assert_eq!(config.feastol(), Config::DEFAULT_FEASTOL);
		assert_eq!(config.max_closure_depth(), Config::DEFAULT_MAX_CLOSURE_DEPTH);

		let config = config.with_feastol(1e-4).with_max_closure_edges(3);
		assert_eq!(config.feastol(), 1e-4);
		assert_eq!(config.max_closure_edges(), 3);
		assert_eq!(config.epsilon(), Config::DEFAULT_EPSILON);
	}

	#[test]
	fn test_rounding() {
		let config = Config::default();
		assert_eq!(config.feas_ceil(2.0000001), 2.0);
		assert_eq!(config.feas_ceil(2.1), 3.0);
		assert_eq!(config.feas_floor(2.9999999), 3.0);
		assert_eq!(config.feas_floor(-0.5), -1.0);
		assert_eq!(config.feas_ceil(f64::NEG_INFINITY), f64::NEG_INFINITY);
		assert!(config.is_feas_integral(4.0000001));
		assert!(!config.is_feas_integral(4.5));
	}

	#[test]
	fn test_infinity() {
		let config = Config::default();
		assert_eq!(config.normalize(1e21), f64::INFINITY);
		assert_eq!(config.normalize(-1e20), f64::NEG_INFINITY);
		assert_eq!(config.normalize(12.5), 12.5);
		assert!(!config.is_eq(f64::INFINITY, 1e19));
		assert!(config.is_eq(f64::INFINITY, f64::INFINITY));
	}
}
