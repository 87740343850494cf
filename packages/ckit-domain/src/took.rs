//! In-place rewrite of `extra.took` inside a serialized response.
//!
//! Cache hits are served from stored bytes without decoding them. `extra` is the last field of a
//! response and `took` its first key, so the last `"extra":{"took":<number>` occurrence gets the
//! new number. Matched blobs may carry the same bytes and stay as they were, like every other
//! byte. No match means the caller serves the body unchanged.

use std::{sync::LazyLock, time::Duration};

use regex::bytes::Regex;

const TOOK_PATTERN: &str = r#""extra":\{"took":-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?"#;

static TOOK_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(TOOK_PATTERN).ok());

/// Returns `None` when the body has no `extra.took` field to rewrite.
pub fn patch_took(body: &[u8], took: Duration) -> Option<Vec<u8>> {
	let re = TOOK_RE.as_ref()?;
	let found = re.find_iter(body).last()?;
	// `Display` for f64 never uses exponent notation, so the result is always a JSON number.
	let replacement = format!(r#""extra":{{"took":{}"#, took.as_secs_f64());
	let mut out = Vec::with_capacity(body.len() + replacement.len());

	out.extend_from_slice(&body[..found.start()]);
	out.extend_from_slice(replacement.as_bytes());
	out.extend_from_slice(&body[found.end()..]);

	Some(out)
}

#[cfg(test)]
mod tests {
	use serde_json::Value;

	use super::*;

	fn without_took(mut value: Value) -> Value {
		if let Some(extra) = value.get_mut("extra").and_then(Value::as_object_mut) {
			extra.remove("took");
		}

		value
	}

	#[test]
	fn rewrites_only_the_took_number() {
		let body = br#"{"id":"a","citing":[{"took":9}],"extra":{"took":1.443760546,"cached":true}}"#;
		let patched = patch_took(body, Duration::from_millis(1_500)).expect("pattern must match");

		assert_eq!(
			patched,
			br#"{"id":"a","citing":[{"took":9}],"extra":{"took":1.5,"cached":true}}"#.to_vec()
		);
	}

	#[test]
	fn handles_exponent_notation() {
		let body = br#"{"extra":{"took":1.2e-5,"cached":true}}"#;
		let patched = patch_took(body, Duration::from_micros(3)).expect("pattern must match");
		let value: Value = serde_json::from_slice(&patched).expect("patched body must parse");

		assert_eq!(value["extra"]["took"].as_f64(), Some(0.000003));
		assert_eq!(value["extra"]["cached"], Value::Bool(true));
	}

	#[test]
	fn patched_body_is_still_the_same_document() {
		let body = br#"{"id":"ai-49-x","doi":"10.1/x","citing":[{"title":"A","extra":{"took":"n/a"}}],"cited":[],"unmatched":{"citing":[{"doi":"10.1/y"}],"cited":[]},"extra":{"took":0.25,"citing_count":1,"cached":true}}"#;
		let original: Value = serde_json::from_slice(body).expect("fixture must parse");
		let patched = patch_took(body, Duration::from_secs(2)).expect("pattern must match");
		let value: Value = serde_json::from_slice(&patched).expect("patched body must parse");

		assert_eq!(value["extra"]["took"].as_f64(), Some(2.0));
		assert_eq!(value["citing"][0]["extra"]["took"], Value::String("n/a".to_string()));
		assert_eq!(without_took(value), without_took(original));
	}

	#[test]
	fn blob_with_the_same_bytes_is_left_alone() {
		let body = br#"{"id":"A","citing":[{"id":"B","extra":{"took":7}}],"cited":[],"extra":{"took":0.005,"cached":false}}"#;
		let patched = patch_took(body, Duration::ZERO).expect("pattern must match");

		assert_eq!(
			patched,
			br#"{"id":"A","citing":[{"id":"B","extra":{"took":7}}],"cited":[],"extra":{"took":0,"cached":false}}"#.to_vec()
		);
	}

	#[test]
	fn missing_field_is_reported() {
		assert!(patch_took(br#"{"extra":{"cached":true}}"#, Duration::from_secs(1)).is_none());
		assert!(patch_took(b"", Duration::from_secs(1)).is_none());
	}
}
