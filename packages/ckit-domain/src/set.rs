//! Value-keyed set with the handful of operations the citation join needs.
//!
//! Not synchronized. Each resolution builds its own sets and drops them when it returns.

use std::{
	collections::{HashSet, hash_set},
	hash::Hash,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T>
where
	T: Eq + Hash,
{
	inner: HashSet<T>,
}
impl<T> Set<T>
where
	T: Eq + Hash + Clone,
{
	pub fn new() -> Self {
		Self { inner: HashSet::new() }
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self { inner: HashSet::with_capacity(capacity) }
	}

	/// Returns `true` if the value was not present before.
	pub fn add(&mut self, value: T) -> bool {
		self.inner.insert(value)
	}

	pub fn contains(&self, value: &T) -> bool {
		self.inner.contains(value)
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn union(&self, other: &Self) -> Self {
		let mut out = Self::with_capacity(self.len() + other.len());

		out.inner.extend(self.inner.iter().cloned());
		out.inner.extend(other.inner.iter().cloned());

		out
	}

	/// Elements of `self` that are not in `other`.
	pub fn difference(&self, other: &Self) -> Self {
		self.inner.difference(&other.inner).cloned().collect()
	}

	/// Elements in unspecified order.
	pub fn to_vec(&self) -> Vec<T> {
		self.inner.iter().cloned().collect()
	}
}
impl<T> Set<T>
where
	T: Eq + Hash + Clone + Ord,
{
	pub fn to_sorted_vec(&self) -> Vec<T> {
		let mut out = self.to_vec();

		out.sort();

		out
	}
}
impl<T> Default for Set<T>
where
	T: Eq + Hash + Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> FromIterator<T> for Set<T>
where
	T: Eq + Hash,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = T>,
	{
		Self { inner: iter.into_iter().collect() }
	}
}
impl<T> Extend<T> for Set<T>
where
	T: Eq + Hash,
{
	fn extend<I>(&mut self, iter: I)
	where
		I: IntoIterator<Item = T>,
	{
		self.inner.extend(iter);
	}
}
impl<T> IntoIterator for Set<T>
where
	T: Eq + Hash,
{
	type IntoIter = hash_set::IntoIter<T>;
	type Item = T;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.into_iter()
	}
}
impl<'a, T> IntoIterator for &'a Set<T>
where
	T: Eq + Hash,
{
	type IntoIter = hash_set::Iter<'a, T>;
	type Item = &'a T;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.iter()
	}
}
