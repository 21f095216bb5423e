//! Domains of variables: a lower and upper bound, together with a sorted list
//! of excluded open intervals (holes).

use std::fmt::{self, Display};

use delegate::delegate;

#[derive(Debug, Clone, Copy, PartialEq)]
/// An open interval `(left, right)` of values excluded from a domain.
pub struct Hole {
	/// The left end point of the hole (itself still part of the domain).
	pub left: f64,
	/// The right end point of the hole (itself still part of the domain).
	pub right: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A sorted list of pairwise disjoint holes.
pub struct Holelist {
	/// The holes, sorted by their left end point.
	holes: Vec<Hole>,
}

#[derive(Debug, Clone, PartialEq)]
/// The domain of a variable.
pub struct Domain {
	/// The lower bound of the domain.
	pub(crate) lb: f64,
	/// The upper bound of the domain.
	pub(crate) ub: f64,
	/// The holes excluded from the domain.
	pub(crate) holes: Holelist,
}

impl Hole {
	/// Returns whether the value lies strictly within the hole.
	pub fn contains(&self, val: f64) -> bool {
		self.left < val && val < self.right
	}
}

impl Holelist {
	/// Insert the open interval `(left, right)`, merging it with any hole it
	/// overlaps. Returns whether the list changed.
	pub(crate) fn add(&mut self, left: f64, right: f64) -> bool {
		debug_assert!(left < right, "empty hole ({left}, {right})");
		// Index of the first hole that ends after `left`
		let start = self.holes.partition_point(|h| h.right <= left);
		// Index one past the last hole that starts before `right`
		let end = self.holes.partition_point(|h| h.left < right);
		if start < end {
			let first = self.holes[start];
			let last = self.holes[end - 1];
			if start + 1 == end && first.left <= left && right <= first.right {
				return false;
			}
			let merged = Hole {
				left: first.left.min(left),
				right: last.right.max(right),
			};
			let _ = self.holes.splice(start..end, [merged]);
		} else {
			self.holes.insert(start, Hole { left, right });
		}
		true
	}

	/// Returns whether the value lies within any of the holes.
	pub fn contains(&self, val: f64) -> bool {
		let i = self.holes.partition_point(|h| h.right <= val);
		self.holes.get(i).is_some_and(|h| h.contains(val))
	}

	/// Remove the holes that lie entirely outside of `[lb, ub]`.
	pub(crate) fn restrict(&mut self, lb: f64, ub: f64) {
		self.holes.retain(|h| h.right > lb && h.left < ub);
	}

	delegate! {
		to self.holes {
			/// Returns whether the list contains no holes.
			pub fn is_empty(&self) -> bool;
			/// Returns the number of holes in the list.
			pub fn len(&self) -> usize;
			/// Iterate over the holes in increasing order.
			pub fn iter(&self) -> std::slice::Iter<'_, Hole>;
		}
	}
}

impl Domain {
	/// Create a new domain `[lb, ub]` without holes.
	pub(crate) fn new(lb: f64, ub: f64) -> Self {
		Self {
			lb,
			ub,
			holes: Holelist::default(),
		}
	}

	/// The lower bound of the domain.
	pub fn lb(&self) -> f64 {
		self.lb
	}

	/// The upper bound of the domain.
	pub fn ub(&self) -> f64 {
		self.ub
	}

	/// The holes of the domain.
	pub fn holes(&self) -> &Holelist {
		&self.holes
	}

	/// Returns whether the value is part of the domain.
	pub fn contains(&self, val: f64) -> bool {
		self.lb <= val && val <= self.ub && !self.holes.contains(val)
	}
}

impl Display for Domain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{},{}]", self.lb, self.ub)?;
		for h in self.holes.iter() {
			write!(f, " \\ ({},{})", h.left, h.right)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;

	use crate::domain::{Domain, Hole};

	#[test]
	fn test_hole_merging() {
		let mut dom = Domain::new(0.0, 20.0);
		assert!(dom.holes.add(2.0, 4.0));
		assert!(dom.holes.add(10.0, 12.0));
		assert!(dom.holes.add(6.0, 7.0));
		assert!(!dom.holes.add(2.5, 3.5));
		assert_eq!(dom.holes.len(), 3);
		// Touching open intervals still leave the shared end point
		assert!(dom.holes.add(12.0, 13.0));
		assert!(dom.contains(12.0));
		assert_eq!(dom.holes.len(), 4);
		dom.holes.restrict(0.0, 12.0);

		assert!(dom.holes.add(3.0, 6.5));
		assert_eq!(
			dom.holes.iter().copied().collect::<Vec<_>>(),
			vec![
				Hole {
					left: 2.0,
					right: 7.0
				},
				Hole {
					left: 10.0,
					right: 12.0
				}
			]
		);
		expect!["[0,20] \\ (2,7) \\ (10,12)"].assert_eq(&dom.to_string());
	}

	#[test]
	fn test_contains() {
		let mut dom = Domain::new(-1.0, 5.0);
		let _ = dom.holes.add(1.0, 2.0);
		assert!(dom.contains(1.0));
		assert!(!dom.contains(1.5));
		assert!(dom.contains(2.0));
		assert!(!dom.contains(5.5));

		dom.holes.restrict(2.0, 5.0);
		assert!(dom.holes.is_empty());
	}
}
