use catalog_client::{CatalogClient, CatalogConfig, CatalogError, DEFAULT_BASE_URL};
use migration::MigratorTrait;
use moviedb_services::{CatalogSync, SyncError, SyncOptions};
use moviedb_utils::{connect, load_dotenv, ConfigError, DatabaseConfig, Env};
use sea_orm::DbErr;
use std::{process::ExitCode, time::Duration};
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, metadata::LevelFilter, warn};
use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Error)]
enum JobError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Catalog(#[from] CatalogError),

	#[error("database error: {0}")]
	DbErr(#[from] DbErr),

	#[error(transparent)]
	Sync(#[from] SyncError),

	#[error("failed to install signal handler: {0}")]
	Signal(#[from] std::io::Error),

	#[error("interrupted")]
	Interrupted,
}

#[derive(Debug)]
struct SyncConfig {
	database: DatabaseConfig,
	catalog: CatalogConfig,
	options: SyncOptions,
}

impl SyncConfig {
	fn from_env<F>(env: &Env<F>) -> Result<Self, JobError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let database = DatabaseConfig::from_env(env)?;

		let token = env.required("CATALOG_API_TOKEN")?;
		let base_url = env.string_or("CATALOG_API_URL", DEFAULT_BASE_URL);
		let page_size = env.parse_or("CATALOG_PAGE_SIZE", 100u32)?;
		let timeout = env.parse_or("CATALOG_TIMEOUT_SECS", 30u64)?;
		let catalog = CatalogConfig::new(&base_url, token)?
			.with_page_size(page_size)
			.with_timeout(Duration::from_secs(timeout));

		let page_delay = env.parse_or("SYNC_PAGE_DELAY_MS", 2000u64)?;

		Ok(Self {
			database,
			catalog,
			options: SyncOptions {
				page_delay: Duration::from_millis(page_delay),
			},
		})
	}
}

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

	match _main().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!(error = %e, "catalog sync failed");
			ExitCode::FAILURE
		}
	}
}

async fn _main() -> Result<(), JobError> {
	let config = SyncConfig::from_env(&Env::process())?;
	info!(?config, "starting catalog sync job");

	let db = connect(&config.database).await?;
	migration::Migrator::up(&db, None).await?;

	let client = CatalogClient::new(config.catalog)?;
	let sync = CatalogSync::new(db.clone(), client).with_options(config.options);

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

	let result = tokio::select! {
		result = sync.run() => result.map_err(JobError::from),
		_ = ct.cancelled() => {
			warn!("sync interrupted, the current item is rolled back");
			Err(JobError::Interrupted)
		}
	};

	db.close().await?;
	result.map(|_| ())
}
