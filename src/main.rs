use clap::Parser;

use finitura::cli::{self, Cli, Commands};
use finitura::{config, runtime, system};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let app_config = config::init_config();
    // The guard flushes buffered log writes on drop; keep it for the
    // whole program lifetime.
    let _log_guard = system::logging::init_logging(app_config);

    match cli.command {
        Some(Commands::CreateAdmin {
            name,
            email,
            password,
        }) => cli::create_admin(name, email, password)
            .await
            .map_err(anyhow::Error::new),
        Some(Commands::ConfigGen { output_path, force }) => {
            cli::generate_config(output_path, force).map_err(anyhow::Error::new)
        }
        Some(Commands::Serve) | None => runtime::run_server().await,
    }
}
