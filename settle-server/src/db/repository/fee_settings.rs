//! Fee Settings Repository
//!
//! A single active record drives all calculations; every write keeps a
//! versioned copy so historical settlements can be replayed against the
//! rules that produced them.

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::FeeSettings;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "fee_settings";
const ACTIVE_KEY: &str = "active";

#[derive(Clone)]
pub struct FeeSettingsRepository {
    base: BaseRepository,
}

impl FeeSettingsRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// The currently active configuration, if any has been written
    pub async fn active(&self) -> RepoResult<Option<FeeSettings>> {
        let settings: Option<FeeSettings> = self
            .base
            .db()
            .select((TABLE, ACTIVE_KEY))
            .await
            .map_err(RepoError::from)?;
        Ok(settings)
    }

    /// Validate and store a new configuration. The version is bumped past
    /// the current active one, the active record is replaced, and a
    /// versioned copy is kept for audit replay.
    pub async fn store(&self, mut settings: FeeSettings) -> RepoResult<FeeSettings> {
        settings.validate()?;

        let current_version = self.active().await?.map(|s| s.version).unwrap_or(0);
        settings.version = current_version + 1;
        settings.updated_at = shared::util::now_millis();

        let _: Option<FeeSettings> = self
            .base
            .db()
            .upsert((TABLE, ACTIVE_KEY))
            .content(settings.clone())
            .await
            .map_err(RepoError::from)?;

        let _: Option<FeeSettings> = self
            .base
            .db()
            .upsert((TABLE, format!("v{}", settings.version)))
            .content(settings.clone())
            .await
            .map_err(RepoError::from)?;

        tracing::info!(version = settings.version, "Fee settings updated");
        Ok(settings)
    }

    /// Load a historical version, for settlement replay
    pub async fn by_version(&self, version: u32) -> RepoResult<Option<FeeSettings>> {
        let settings: Option<FeeSettings> = self
            .base
            .db()
            .select((TABLE, format!("v{}", version)))
            .await
            .map_err(RepoError::from)?;
        Ok(settings)
    }
}
