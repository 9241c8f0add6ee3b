use clap::Parser;

use majlis_portal::cli::Cli;
use majlis_portal::config::{get_config, init_config};
use majlis_portal::runtime::modes;
use majlis_portal::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());

    let config = get_config();
    let _guard = init_logging(&config)?;

    modes::run(cli.command).await
}
