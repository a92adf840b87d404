//! Seam between the consultation core and the backend client.

use async_trait::async_trait;
use koi_api::{Client, ConsultationPayload, DestinyRelations};
use std::sync::Arc;

/// Backend operations the consultation core depends on.
///
/// Implemented by [`koi_api::Client`] in production and by scripted mocks
/// in tests, so callers can assert on fetch counts without a network.
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// Fetch the generation/overcoming element-name lists for one destiny.
    async fn destiny_relations(&self, destiny: &str) -> Result<DestinyRelations, koi_api::Error>;

    /// Fetch the auto-consultation payload for a birth year.
    async fn consultation_by_year(&self, year: i32)
        -> Result<ConsultationPayload, koi_api::Error>;
}

#[async_trait]
impl RelationSource for Client {
    async fn destiny_relations(&self, destiny: &str) -> Result<DestinyRelations, koi_api::Error> {
        Client::destiny_relations(self, destiny).await
    }

    async fn consultation_by_year(
        &self,
        year: i32,
    ) -> Result<ConsultationPayload, koi_api::Error> {
        Client::consultation_by_year(self, year).await
    }
}

#[async_trait]
impl<S: RelationSource + ?Sized> RelationSource for Arc<S> {
    async fn destiny_relations(&self, destiny: &str) -> Result<DestinyRelations, koi_api::Error> {
        (**self).destiny_relations(destiny).await
    }

    async fn consultation_by_year(
        &self,
        year: i32,
    ) -> Result<ConsultationPayload, koi_api::Error> {
        (**self).consultation_by_year(year).await
    }
}
