//! Business logic services

pub mod catalog;
pub mod ledger;
pub mod scheduler;
pub mod stats;
pub mod sync;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{DirectoryConfig, LoansConfig},
    directory::HttpDirectorySource,
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
    pub scheduler: scheduler::SyncScheduler,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        loans_config: LoansConfig,
        directory_config: DirectoryConfig,
    ) -> AppResult<Self> {
        let source = Arc::new(HttpDirectorySource::new(&directory_config)?);
        let sync = sync::SyncService::new(repository.clone(), source, directory_config.clone());

        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), loans_config),
            stats: stats::StatsService::new(repository),
            scheduler: scheduler::SyncScheduler::new(sync, directory_config.sync_interval_days),
        })
    }
}
