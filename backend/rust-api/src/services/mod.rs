use std::sync::Arc;

use crate::config::Config;
use crate::middlewares::auth::JwtService;

pub mod content_service;
pub mod game_service;
pub mod gamification_service;
pub mod interpret_service;
pub mod progress_service;
pub mod session_service;
pub mod settings_service;
pub mod storage;

use game_service::GameService;
use gamification_service::GamificationService;
use interpret_service::InterpretService;
use progress_service::ProgressService;
use session_service::SessionService;
use settings_service::SettingsService;
use storage::{MemoryStorage, MongoStorage, Storage};

pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub sessions: SessionService,
    pub games: GameService,
    pub gamification: GamificationService,
    pub progress: ProgressService,
    pub settings: SettingsService,
    pub interpreter: InterpretService,
    pub jwt: JwtService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = match config.storage_backend.as_str() {
            "memory" => {
                tracing::info!("Using in-memory storage backend");
                Arc::new(MemoryStorage::new())
            }
            _ => {
                tracing::info!("Connecting to MongoDB at {}", config.mongo_uri);
                let client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
                let db = client.database(&config.mongo_database);
                Arc::new(MongoStorage::new(db))
            }
        };

        let gamification = GamificationService::load(storage.clone()).await?;

        Ok(Self {
            sessions: SessionService::new(),
            games: GameService::new(),
            gamification,
            progress: ProgressService::new(storage.clone()),
            settings: SettingsService::new(storage.clone()),
            interpreter: InterpretService::new(&config),
            jwt: JwtService::new(&config.jwt_secret),
            storage,
            config,
        })
    }
}
