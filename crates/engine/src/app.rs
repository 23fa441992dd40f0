//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    config::AppConfig,
    file_storage::LocalFileStorage,
    persistence::SqliteRepository,
    ports::{ClockPort, EmergencyRepo, FileStorage, MapFeatureRepo, RegulationRepo, UserRepo},
};
use crate::use_cases::{EmergencyUseCases, MapUseCases, RegulationUseCases, UserUseCases};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    /// Upload handlers stream multipart files straight into this store.
    pub storage: Arc<LocalFileStorage>,
    pub config: AppConfig,
}

/// Container for all use cases.
pub struct UseCases {
    pub regulation: RegulationUseCases,
    pub emergency: EmergencyUseCases,
    pub map: MapUseCases,
    pub user: UserUseCases,
}

impl App {
    pub fn new(
        repos: SqliteRepository,
        storage: Arc<LocalFileStorage>,
        clock: Arc<dyn ClockPort>,
        config: AppConfig,
    ) -> Self {
        let regulation_repo: Arc<dyn RegulationRepo> = Arc::new(repos.regulations());
        let emergency_repo: Arc<dyn EmergencyRepo> = Arc::new(repos.emergencies());
        let map_repo: Arc<dyn MapFeatureRepo> = Arc::new(repos.map_features());
        let user_repo: Arc<dyn UserRepo> = Arc::new(repos.users());
        let file_storage: Arc<dyn FileStorage> = storage.clone();

        let use_cases = UseCases {
            regulation: RegulationUseCases::new(regulation_repo, file_storage, clock.clone()),
            emergency: EmergencyUseCases::new(
                emergency_repo,
                user_repo.clone(),
                clock.clone(),
                config.cooldown,
            ),
            map: MapUseCases::new(map_repo, clock.clone()),
            user: UserUseCases::new(user_repo, clock, config.cooldown),
        };

        Self {
            use_cases,
            storage,
            config,
        }
    }
}
