use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use toml::Value;

use ckit_config::{Config, Error, IndexDataBackend};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8000"
log_level = "info"

[storage.identifiers]
dsn = "postgres://localhost/ckit_identifiers"
pool_max_conns = 4

[storage.citations]
dsn = "postgres://localhost/ckit_citations"
pool_max_conns = 4

[index_data]
timeout_ms = 5000

[[index_data.backends]]
kind = "http"
url = " http://localhost:8820/ "

[[index_data.backends]]
kind = "postgres"
dsn = "postgres://localhost/ckit_index"
pool_max_conns = 2

[cache]
enabled = true
trigger_ms = 250
ttl_secs = 28800
sweep_interval_secs = 300
"#;

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(raw: &str) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock before epoch.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("ckit_config_{nanos}_{seq}.toml"));

	fs::write(&path, raw).expect("Failed to write temp config.");

	path
}

fn validation_message(raw: &str) -> String {
	match ckit_config::parse(raw) {
		Err(Error::Validation { message }) => message,
		Err(other) => panic!("Expected validation error, got {other:?}."),
		Ok(_) => panic!("Expected validation error, got a valid config."),
	}
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let cfg: Config = ckit_config::load(&path).expect("Failed to load sample config.");

	fs::remove_file(&path).expect("Failed to remove temp config.");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8000");
	assert_eq!(cfg.service.request_timeout(), Duration::from_secs(30));
	assert!(!cfg.service.stopwatch);
	assert_eq!(cfg.index_data.backends.len(), 2);
	assert!(cfg.cache.enabled);
	assert_eq!(cfg.cache.trigger(), Duration::from_millis(250));
	assert_eq!(cfg.cache.ttl(), Duration::from_secs(8 * 60 * 60));
}

#[test]
fn http_backend_urls_are_trimmed() {
	let cfg = ckit_config::parse(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	match &cfg.index_data.backends[0] {
		IndexDataBackend::Http { url } => assert_eq!(url, "http://localhost:8820"),
		other => panic!("Expected http backend, got {other:?}."),
	}
	match &cfg.index_data.backends[1] {
		IndexDataBackend::Postgres(pg) => assert_eq!(pg.pool_max_conns, 2),
		other => panic!("Expected postgres backend, got {other:?}."),
	}
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("ckit_config_does_not_exist.toml");
	let err = ckit_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}

#[test]
fn malformed_file_reports_parse_error_with_path() {
	let path = write_temp_config("[service\nhttp_bind = ");
	let err = ckit_config::load(&path).expect_err("Expected parse error.");

	fs::remove_file(&path).expect("Failed to remove temp config.");

	match err {
		Error::ParseConfig { path: reported, .. } => assert_eq!(reported, path),
		other => panic!("Expected parse error, got {other:?}."),
	}
}

#[test]
fn cache_section_is_optional_and_disabled_by_default() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	root.as_table_mut().expect("Sample config must be a table.").remove("cache");

	let raw = toml::to_string(&root).expect("Failed to render config.");
	let cfg = ckit_config::parse(&raw).expect("Failed to parse config without cache.");

	assert!(!cfg.cache.enabled);
}

#[test]
fn rejects_zero_request_timeout() {
	let raw = sample_with("service", "request_timeout_ms", Value::Integer(0));

	assert_eq!(validation_message(&raw), "service.request_timeout_ms must be greater than zero.");
}

#[test]
fn rejects_empty_identifier_dsn() {
	let raw = sample_with("storage.identifiers", "dsn", Value::String("  ".to_string()));

	assert_eq!(validation_message(&raw), "storage.identifiers.dsn must be non-empty.");
}

#[test]
fn rejects_zero_citation_pool() {
	let raw = sample_with("storage.citations", "pool_max_conns", Value::Integer(0));

	assert_eq!(
		validation_message(&raw),
		"storage.citations.pool_max_conns must be greater than zero."
	);
}

#[test]
fn rejects_empty_backend_list() {
	let raw = sample_with("index_data", "backends", Value::Array(Vec::new()));

	assert_eq!(
		validation_message(&raw),
		"index_data.backends must contain at least one backend."
	);
}

#[test]
fn rejects_non_http_backend_url() {
	let mut backend = toml::map::Map::new();

	backend.insert("kind".to_string(), Value::String("http".to_string()));
	backend.insert("url".to_string(), Value::String("ftp://example.org".to_string()));

	let raw = sample_with("index_data", "backends", Value::Array(vec![Value::Table(backend)]));

	assert!(validation_message(&raw).contains("must be an http(s) URL"));
}

#[test]
fn rejects_zero_ttl_only_when_cache_enabled() {
	let raw = sample_with("cache", "ttl_secs", Value::Integer(0));

	assert_eq!(
		validation_message(&raw),
		"cache.ttl_secs must be greater than zero when the cache is enabled."
	);

	let mut root: Value = toml::from_str(&raw).expect("Failed to parse config.");
	let cache = root
		.get_mut("cache")
		.and_then(Value::as_table_mut)
		.expect("Config must include [cache].");

	cache.insert("enabled".to_string(), Value::Boolean(false));

	let raw = toml::to_string(&root).expect("Failed to render config.");

	assert!(ckit_config::parse(&raw).is_ok());
}
