/* tests/codec_tests.rs */

#![cfg(feature = "json")]

use livekv::codec::{AnyFormat, ConfigCodec, DecodeError};
use livekv::{CollectionEntry, ConfigSnapshot};

#[test]
fn test_decode_entry_list() {
	let codec = ConfigCodec::json();
	let snapshot = codec
		.decode(br#"[{"source":"/var/log/a.log","sink":"topicA"}]"#)
		.unwrap();

	assert_eq!(snapshot.len(), 1);
	assert_eq!(snapshot[0], CollectionEntry::new("/var/log/a.log", "topicA"));
}

#[test]
fn test_decode_keeps_order() {
	let codec = ConfigCodec::json();
	let snapshot = codec
		.decode(br#"[{"source":"b","sink":"2"},{"source":"a","sink":"1"},{"source":"c","sink":"3"}]"#)
		.unwrap();

	let sources: Vec<&str> = snapshot.iter().map(|e| e.source.as_str()).collect();
	assert_eq!(sources, ["b", "a", "c"]);
}

#[test]
fn test_decode_legacy_field_names() {
	let codec = ConfigCodec::json();
	let snapshot = codec
		.decode(br#"[{"path":"/var/log/nginx/access.log","topic":"web_log"}]"#)
		.unwrap();

	assert_eq!(
		snapshot.entries(),
		[CollectionEntry::new("/var/log/nginx/access.log", "web_log")]
	);
}

#[test]
fn test_absent_payload_is_empty_snapshot() {
	let codec = ConfigCodec::json();
	for raw in [&b""[..], b"   \n", b"null", b" null\n", b"[]"] {
		let snapshot = codec.decode(raw).unwrap();
		assert!(snapshot.is_empty(), "payload {:?} should decode empty", raw);
	}
}

#[test]
fn test_malformed_payload_is_error() {
	let codec = ConfigCodec::json();
	for raw in [
		&b"not-json"[..],
		br#"{"source":"a","sink":"b"}"#,
		br#"[{"source":"a"}]"#,
		br#"[{"source":"a","sink":"b"}"#,
	] {
		match codec.decode(raw) {
			Err(DecodeError::Parse(_)) => (),
			other => panic!("expected parse error for {:?}, got {:?}", raw, other),
		}
	}
}

#[test]
fn test_encode_then_decode() {
	let codec = ConfigCodec::default();
	let snapshot: ConfigSnapshot = vec![
		CollectionEntry::new("/var/log/a.log", "topicA"),
		CollectionEntry::new("/var/log/*.log", "topicB"),
	]
	.into();

	let raw = codec.encode(&snapshot).unwrap();
	assert_eq!(codec.decode(&raw).unwrap(), snapshot);
}

#[test]
fn test_format_from_extension() {
	assert_eq!(AnyFormat::from_extension("json"), Some(AnyFormat::Json));
	assert_eq!(AnyFormat::from_extension("ini"), None);
}

#[cfg(feature = "yaml")]
#[test]
fn test_decode_yaml() {
	let codec = ConfigCodec::new(AnyFormat::Yaml);
	let snapshot = codec
		.decode(b"- source: /var/log/a.log\n  sink: topicA\n- path: /var/log/b.log\n  topic: topicB\n")
		.unwrap();

	assert_eq!(
		snapshot.entries(),
		[
			CollectionEntry::new("/var/log/a.log", "topicA"),
			CollectionEntry::new("/var/log/b.log", "topicB"),
		]
	);
	assert!(codec.decode(b"~").unwrap().is_empty());
}

#[cfg(feature = "postcard")]
#[test]
fn test_postcard_encode_then_decode() {
	let codec = ConfigCodec::new(AnyFormat::Postcard);
	let snapshot: ConfigSnapshot = vec![CollectionEntry::new("/var/log/a.log", "topicA")].into();

	let raw = codec.encode(&snapshot).unwrap();
	assert_eq!(codec.decode(&raw).unwrap(), snapshot);
	assert!(codec.decode(b"").unwrap().is_empty());
}

#[cfg(feature = "postcard")]
#[test]
fn test_postcard_trailing_bytes_rejected() {
	let codec = ConfigCodec::new(AnyFormat::Postcard);
	let snapshot: ConfigSnapshot = vec![CollectionEntry::new("/var/log/a.log", "topicA")].into();

	let mut raw = codec.encode(&snapshot).unwrap();
	raw.extend_from_slice(&[0x01, 0x02]);
	match codec.decode(&raw) {
		Err(DecodeError::Parse(reason)) => assert!(reason.contains("trailing")),
		other => panic!("expected parse error, got {:?}", other),
	}
}

#[cfg(feature = "validate")]
#[test]
fn test_empty_sink_rejected() {
	let codec = ConfigCodec::json();
	match codec.decode(br#"[{"source":"/var/log/a.log","sink":""}]"#) {
		Err(DecodeError::Validation(_)) => (),
		other => panic!("expected validation error, got {:?}", other),
	}
}

#[cfg(feature = "glob")]
#[test]
fn test_invalid_source_pattern_rejected() {
	let codec = ConfigCodec::json();
	match codec.decode(br#"[{"source":"/var/log/[a.log","sink":"topicA"}]"#) {
		Err(DecodeError::Pattern(_)) => (),
		other => panic!("expected pattern error, got {:?}", other),
	}

	let snapshot = codec
		.decode(br#"[{"source":"/var/log/*.log","sink":"topicA"}]"#)
		.unwrap();
	let matcher = snapshot[0].matcher().unwrap();
	assert!(matcher.is_match("/var/log/app.log"));
	assert!(!matcher.is_match("/var/log/app.txt"));
}
