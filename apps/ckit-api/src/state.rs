use std::sync::Arc;

use ckit_service::{CkitService, MemoryCache, Settings, Stores};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CkitService>,
}
impl AppState {
	/// Connects every store. With caching enabled, also starts the cache sweeper, which stops
	/// once the last state clone is dropped.
	pub async fn new(config: ckit_config::Config) -> color_eyre::Result<Self> {
		let stores = Stores::connect(&config).await?;
		let settings = Settings::from_config(&config);
		let service = if config.cache.enabled {
			let cache = Arc::new(MemoryCache::new());

			let _ = cache.spawn_sweeper(config.cache.sweep_interval());

			CkitService::with_cache(settings, stores, cache)
		} else {
			CkitService::new(settings, stores)
		};

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: CkitService) -> Self {
		Self { service: Arc::new(service) }
	}
}
