use access_key_admin::cli::{self, Cli, Command};
use access_key_admin::infrastructure::logging::init_logging;
use access_key_admin::AppConfig;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(store) = cli.store {
        config.store.path = store;
    }

    init_logging(&config.logging);

    match cli.command {
        Command::List { server } => cli::list::run(&config, server).await,
        Command::Create { server, form } => cli::form::run_create(&config, server, &form).await,
        Command::Edit { id, form } => cli::form::run_edit(&config, id, &form).await,
    }
}
