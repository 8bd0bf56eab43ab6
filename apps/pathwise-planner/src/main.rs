use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = pathwise_planner::Args::parse();
	pathwise_planner::run(args).await
}
