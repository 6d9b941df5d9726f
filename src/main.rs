use clap::Parser;
use emotepack::cli::{Cli, Commands};
use emotepack::output::Printer;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let printer = if cli.no_color {
        Printer::plain()
    } else {
        Printer::new()
    };

    match cli.command {
        Commands::Build(args) => emotepack::cli::build::run(args, &printer).await?,
        Commands::Check(args) => emotepack::cli::check::run(args, &printer)?,
        Commands::Init(args) => emotepack::cli::init::run(args, &printer)?,
    }

    Ok(())
}
