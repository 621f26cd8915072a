//! Application state wiring all services together.
//!
//! Services are generic over repository and provider traits; AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use callcoach_core::service::coach::CoachingService;
use callcoach_core::service::report::ReportService;
use callcoach_infra::config::load_config;
use callcoach_infra::filesystem::resolve_data_dir;
use callcoach_infra::filesystem::transcript::FsTranscriptStore;
use callcoach_infra::llm::EnvProviderFactory;
use callcoach_infra::sqlite::call::SqliteCallRepository;
use callcoach_infra::sqlite::coaching::SqliteCoachingRepository;
use callcoach_infra::sqlite::ledger::SqliteLedgerRepository;
use callcoach_infra::sqlite::pool::{DatabasePool, database_url};
use callcoach_types::config::CoachConfig;

pub type ConcreteCoachingService = CoachingService<
    SqliteCallRepository,
    FsTranscriptStore,
    SqliteCoachingRepository,
    SqliteLedgerRepository,
    EnvProviderFactory,
>;

pub type ConcreteReportService = ReportService<
    SqliteCallRepository,
    FsTranscriptStore,
    SqliteCoachingRepository,
    SqliteLedgerRepository,
>;

#[derive(Clone)]
pub struct AppState {
    pub coaching_service: Arc<ConcreteCoachingService>,
    pub report_service: Arc<ConcreteReportService>,
    pub config: CoachConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load config, open the database and wire
    /// the services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let calls = SqliteCallRepository::new(db_pool.clone());
        let coaching = SqliteCoachingRepository::new(db_pool.clone());
        let ledger = SqliteLedgerRepository::new(db_pool);
        let transcripts = FsTranscriptStore::new(&data_dir);

        let report_service = ReportService::new(
            calls.clone(),
            transcripts.clone(),
            coaching.clone(),
            ledger.clone(),
        );
        let coaching_service = CoachingService::new(
            calls,
            transcripts,
            coaching,
            ledger,
            EnvProviderFactory::new(config.clone()),
            config.default_model.clone(),
        );

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            coaching_service: Arc::new(coaching_service),
            report_service: Arc::new(report_service),
            config,
            data_dir,
        })
    }
}
