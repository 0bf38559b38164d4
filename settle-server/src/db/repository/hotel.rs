//! Hotel Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Hotel;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "hotel";

#[derive(Clone)]
pub struct HotelRepository {
    base: BaseRepository,
}

impl HotelRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, hotel_id: &str) -> RepoResult<Option<Hotel>> {
        let record: Option<Hotel> = self
            .base
            .db()
            .select((TABLE, hotel_id))
            .await
            .map_err(RepoError::from)?;
        Ok(record)
    }

    pub async fn get(&self, hotel_id: &str) -> RepoResult<Hotel> {
        self.find_by_id(hotel_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("hotel {}", hotel_id)))
    }

    pub async fn upsert(&self, hotel: &Hotel) -> RepoResult<()> {
        let _: Option<Hotel> = self
            .base
            .db()
            .upsert((TABLE, hotel.hotel_id.clone()))
            .content(hotel.clone())
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }
}
