//! Delivery Partner Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::DeliveryPartner;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "delivery_partner";

#[derive(Clone)]
pub struct DeliveryPartnerRepository {
    base: BaseRepository,
}

impl DeliveryPartnerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, partner_id: &str) -> RepoResult<Option<DeliveryPartner>> {
        let record: Option<DeliveryPartner> = self
            .base
            .db()
            .select((TABLE, partner_id))
            .await
            .map_err(RepoError::from)?;
        Ok(record)
    }

    pub async fn upsert(&self, partner: &DeliveryPartner) -> RepoResult<()> {
        let _: Option<DeliveryPartner> = self
            .base
            .db()
            .upsert((TABLE, partner.partner_id.clone()))
            .content(partner.clone())
            .await
            .map_err(RepoError::from)?;
        Ok(())
    }
}
