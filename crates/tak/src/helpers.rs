//! Helper types and functions that are used throughout the crate.

pub(crate) mod linear_transform;
