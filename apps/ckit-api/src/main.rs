use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = ckit_api::Args::parse();
	ckit_api::run(args).await
}
