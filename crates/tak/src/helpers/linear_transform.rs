//! Methods to perform affine transformations of real values and bounds.

use std::ops::{Add, Mul, Neg};

use crate::BoundType;

#[derive(Debug, Clone, Copy, PartialEq)]
/// An affine transformation of a real value.
///
/// The transformation will take a value `x` and transform it to `scale * x +
/// offset`. The scale is never zero, so the transformation can always be
/// reversed.
pub(crate) struct LinearTransform {
	/// The multiplicative scale.
	pub(crate) scale: f64,
	/// The additive offset.
	pub(crate) offset: f64,
}

impl LinearTransform {
	/// Creates a new transformation `scale * x + offset`.
	pub(crate) fn new(scale: f64, offset: f64) -> Self {
		debug_assert!(scale != 0.0, "linear transformation with zero scale");
		Self { scale, offset }
	}

	/// The transformation used by a negated variable: `offset - x`.
	pub(crate) fn negation(offset: f64) -> Self {
		Self::new(-1.0, offset)
	}

	/// Return whether the scale applied by the linear transformation is positive.
	pub(crate) fn positive_scale(&self) -> bool {
		self.scale > 0.0
	}

	/// Perform the reverse linear transformation on a value.
	pub(crate) fn rev_transform(&self, val: f64) -> f64 {
		(val - self.offset) / self.scale
	}

	/// Perform the reverse transformation on a bound.
	///
	/// Returns the transformed bound and the type of bound that it forms on the
	/// original value: a negative scale turns lower bounds into upper bounds
	/// and vice versa.
	pub(crate) fn rev_transform_bound(&self, val: f64, bound_type: BoundType) -> (f64, BoundType) {
		let bt = if self.positive_scale() {
			bound_type
		} else {
			!bound_type
		};
		(self.rev_transform(val), bt)
	}

	/// Perform the linear transformation on a value.
	pub(crate) fn transform(&self, val: f64) -> f64 {
		val * self.scale + self.offset
	}

	/// Perform the transformation on a bound.
	///
	/// Returns the transformed bound and the type of bound that it forms on the
	/// transformed value.
	pub(crate) fn transform_bound(&self, val: f64, bound_type: BoundType) -> (f64, BoundType) {
		let bt = if self.positive_scale() {
			bound_type
		} else {
			!bound_type
		};
		(self.transform(val), bt)
	}

	/// Transform the interval `[lb, ub]`, returning the (ordered) image.
	pub(crate) fn transform_interval(&self, lb: f64, ub: f64) -> (f64, f64) {
		if self.positive_scale() {
			(self.transform(lb), self.transform(ub))
		} else {
			(self.transform(ub), self.transform(lb))
		}
	}

	/// Reverse transform the interval `[lb, ub]`, returning the (ordered)
	/// pre-image.
	pub(crate) fn rev_transform_interval(&self, lb: f64, ub: f64) -> (f64, f64) {
		if self.positive_scale() {
			(self.rev_transform(lb), self.rev_transform(ub))
		} else {
			(self.rev_transform(ub), self.rev_transform(lb))
		}
	}

	/// Compose two transformations: the result applies `inner` first and then
	/// `self`.
	pub(crate) fn after(&self, inner: &LinearTransform) -> Self {
		Self {
			scale: self.scale * inner.scale,
			offset: self.scale * inner.offset + self.offset,
		}
	}

	/// The inverse transformation.
	pub(crate) fn inverse(&self) -> Self {
		Self {
			scale: 1.0 / self.scale,
			offset: -self.offset / self.scale,
		}
	}
}

impl Add<f64> for LinearTransform {
	type Output = Self;

	fn add(self, rhs: f64) -> Self::Output {
		LinearTransform {
			scale: self.scale,
			offset: self.offset + rhs,
		}
	}
}

impl Default for LinearTransform {
	fn default() -> Self {
		Self {
			scale: 1.0,
			offset: 0.0,
		}
	}
}

impl Mul<f64> for LinearTransform {
	type Output = Self;

	fn mul(self, rhs: f64) -> Self::Output {
		debug_assert!(rhs != 0.0);
		LinearTransform {
			scale: self.scale * rhs,
			offset: self.offset * rhs,
		}
	}
}

impl Neg for LinearTransform {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			scale: -self.scale,
			offset: -self.offset,
		}
	}
}
