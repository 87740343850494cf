use ckit_domain::{Direction, Set};

fn set(values: &[&str]) -> Set<String> {
	values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn matched_and_unmatched_partition_the_related_set() {
	let cases = [
		(set(&["d2", "d3"]), set(&[]), set(&["d2"])),
		(set(&["d2"]), set(&["d4", "d5"]), set(&["d5"])),
		(set(&["d2", "d6"]), set(&["d6", "d7"]), set(&["d2", "d6", "d7"])),
		(set(&[]), set(&["d8"]), set(&[])),
	];

	for (outbound, inbound, matched) in cases {
		let related = outbound.union(&inbound);
		let unmatched = related.difference(&matched);

		assert_eq!(unmatched.union(&matched), related);
		assert_eq!(unmatched.difference(&matched), unmatched);

		for doi in &unmatched {
			assert!(Direction::classify(doi, &outbound, &inbound).is_some());
		}
	}
}

#[test]
fn sorted_view_is_deterministic() {
	let a = set(&["10.3/c", "10.1/a", "10.2/b"]);
	let b = set(&["10.2/b", "10.3/c", "10.1/a"]);

	assert_eq!(a.to_sorted_vec(), b.to_sorted_vec());
	assert_eq!(a.to_sorted_vec(), vec!["10.1/a", "10.2/b", "10.3/c"]);
}
