use agroavia::cli::{self, Cli};
use agroavia::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    tracing::debug!("agroavia {} built {}", agroavia::VERSION, agroavia::BUILD_DATE);

    let stdout = std::io::stdout();
    cli::run(cli, &mut stdout.lock())
}
