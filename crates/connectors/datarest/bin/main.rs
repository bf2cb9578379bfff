use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use datarest::{build_router, ServerState, TransformRegistry};
use datarest_configuration::parse_routes_file;

#[derive(Parser)]
#[command(about = "Serve relational tables over declarative URL queries")]
struct Args {
    /// Path to the YAML routes file.
    #[arg(long, default_value = "routes.yaml")]
    routes: PathBuf,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Upper bound on concurrently executing queries. Defaults to the
    /// number of CPUs.
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let routes = parse_routes_file(&args.routes).await?;
    let workers = args.workers.unwrap_or_else(num_cpus::get);
    let app = build_router(
        routes,
        &TransformRegistry::with_builtins(),
        ServerState::new(workers),
    )?;

    let address = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(%address, workers, "starting server");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
