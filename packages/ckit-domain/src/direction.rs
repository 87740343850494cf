use std::hash::Hash;

use crate::set::Set;

/// Which side of the origin document a related document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	/// The origin cites this document (outbound edge).
	Citing,
	/// This document cites the origin (inbound edge).
	Cited,
}
impl Direction {
	/// Outbound membership wins, so a document on both sides is reported once, as citing.
	pub fn classify<T>(value: &T, outbound: &Set<T>, inbound: &Set<T>) -> Option<Self>
	where
		T: Eq + Hash + Clone,
	{
		if outbound.contains(value) {
			Some(Self::Citing)
		} else if inbound.contains(value) {
			Some(Self::Cited)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classify_prefers_outbound_and_rejects_strangers() {
		let outbound: Set<&str> = ["a", "both"].into_iter().collect();
		let inbound: Set<&str> = ["b", "both"].into_iter().collect();

		assert_eq!(Direction::classify(&"a", &outbound, &inbound), Some(Direction::Citing));
		assert_eq!(Direction::classify(&"b", &outbound, &inbound), Some(Direction::Cited));
		assert_eq!(Direction::classify(&"both", &outbound, &inbound), Some(Direction::Citing));
		assert_eq!(Direction::classify(&"zzz", &outbound, &inbound), None);
	}
}
