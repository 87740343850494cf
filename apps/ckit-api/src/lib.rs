pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = ckit_cli::VERSION,
	rename_all = "kebab",
	styles = ckit_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Print store sizes and exit.
	#[arg(long)]
	pub info: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = ckit_config::load(&args.config)?;
	init_tracing(&config)?;
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(config).await?;

	let health = state.service.ping().await?;
	tracing::info!(index_data = ?health.index_data, "Backing stores reachable.");

	if args.info {
		let info = state.service.info().await?;
		println!("{}", serde_json::to_string_pretty(&info)?);
		return Ok(());
	}

	let app = routes::router(state);

	let http_listener = TcpListener::bind(http_addr).await?;
	tracing::info!(%http_addr, "HTTP server listening.");
	axum::serve(http_listener, app).await?;
	Ok(())
}

fn init_tracing(config: &ckit_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
