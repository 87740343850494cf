mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, IndexData, IndexDataBackend, Postgres, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "service.request_timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, pg) in
		[("storage.identifiers", &cfg.storage.identifiers), ("storage.citations", &cfg.storage.citations)]
	{
		validate_postgres(label, pg)?;
	}

	if cfg.index_data.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "index_data.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.index_data.backends.is_empty() {
		return Err(Error::Validation {
			message: "index_data.backends must contain at least one backend.".to_string(),
		});
	}

	for backend in &cfg.index_data.backends {
		match backend {
			IndexDataBackend::Http { url } =>
				if !(url.starts_with("http://") || url.starts_with("https://")) {
					return Err(Error::Validation {
						message: format!("index_data.backends url {url:?} must be an http(s) URL."),
					});
				},
			IndexDataBackend::Postgres(pg) => validate_postgres("index_data.backends", pg)?,
		}
	}

	if cfg.cache.enabled {
		if cfg.cache.ttl_secs == 0 {
			return Err(Error::Validation {
				message: "cache.ttl_secs must be greater than zero when the cache is enabled."
					.to_string(),
			});
		}
		if cfg.cache.sweep_interval_secs == 0 {
			return Err(Error::Validation {
				message:
					"cache.sweep_interval_secs must be greater than zero when the cache is enabled."
						.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_postgres(label: &str, pg: &Postgres) -> Result<()> {
	if pg.dsn.trim().is_empty() {
		return Err(Error::Validation { message: format!("{label}.dsn must be non-empty.") });
	}
	if pg.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: format!("{label}.pool_max_conns must be greater than zero."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for backend in &mut cfg.index_data.backends {
		if let IndexDataBackend::Http { url } = backend {
			let trimmed = url.trim().trim_end_matches('/').to_string();

			*url = trimmed;
		}
	}
}
