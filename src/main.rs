use migration::MigratorTrait;
use moviedb::{app, config::ServerConfig, AppState};
use moviedb_utils::{connect, load_dotenv, Env};
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, metadata::LevelFilter};
use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::registry()
		.with(ForestLayer::default())
		.with(
			EnvFilter::builder()
				.with_default_directive(LevelFilter::INFO.into())
				.from_env_lossy(),
		)
		.init();

	load_dotenv();

	match serve().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!(error = %e, "server failed");
			ExitCode::FAILURE
		}
	}
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
	let config = ServerConfig::from_env(&Env::process())?;

	let db = connect(&config.database).await?;
	migration::Migrator::up(&db, None).await?;

	let ct = CancellationToken::new();
	let mut terminate = signal(SignalKind::terminate())?;
	tokio::spawn({
		let ct = ct.clone();
		async move {
			tokio::select! {
				_ = terminate.recv() => {},
				_ = tokio::signal::ctrl_c() => {},
			}
			ct.cancel();
		}
	});

	let router = app(AppState::new(db.clone()));

	info!(addr = %config.addr, "listening");
	axum::Server::try_bind(&config.addr)?
		.serve(router.into_make_service())
		.with_graceful_shutdown(ct.cancelled())
		.await?;

	info!("shutting down");
	db.close().await?;
	Ok(())
}
