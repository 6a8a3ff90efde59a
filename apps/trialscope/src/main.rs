use clap::Parser;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = trialscope::Args::parse();
	trialscope::run(args)
}
