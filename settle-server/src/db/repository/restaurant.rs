//! Restaurant Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Restaurant;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "restaurant";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, restaurant_id: &str) -> RepoResult<Option<Restaurant>> {
        let record: Option<Restaurant> = self
            .base
            .db()
            .select((TABLE, restaurant_id))
            .await
            .map_err(RepoError::from)?;
        Ok(record)
    }

    pub async fn get(&self, restaurant_id: &str) -> RepoResult<Restaurant> {
        self.find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("restaurant {}", restaurant_id)))
    }

    pub async fn upsert(&self, restaurant: &Restaurant) -> RepoResult<()> {
        let _: Option<Restaurant> = self
            .base
            .db()
            .upsert((TABLE, restaurant.restaurant_id.clone()))
            .content(restaurant.clone())
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }
}
