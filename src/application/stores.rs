//! Store contracts describing the persistence adapters the core drives.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::blocks::{Block, BlockId};
use crate::domain::pages::{Page, PageField, PageId, SiteId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    /// A write collided with a unique constraint. Stores that enforce
    /// container uniqueness per `(page, name)` report the collision here;
    /// the core propagates it without retrying.
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("storage timeout")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Criteria for a single-page lookup. At most one page matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCriteria {
    Id(PageId),
    Field {
        /// Restricts the match to one site when given.
        site: Option<SiteId>,
        field: PageField,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct NewPageParams {
    pub site: SiteId,
    pub url: Option<String>,
    pub route_name: Option<String>,
    pub name: Option<String>,
    pub decorate: bool,
}

#[derive(Debug, Clone)]
pub struct NewContainerParams {
    pub enabled: bool,
    /// Page the container attaches to.
    pub page: PageId,
    /// Container identifier, stored under the block's name setting.
    pub name: String,
    pub position: i32,
    pub parent: Option<BlockId>,
}

#[async_trait]
pub trait PageStore: Send + Sync {
    /// Returns the single page matching `criteria`, if any.
    async fn find_one(&self, criteria: &PageCriteria) -> Result<Option<Arc<Page>>, StoreError>;

    /// Builds a new, unsaved page record; the store assigns its id.
    async fn create(&self, params: NewPageParams) -> Result<Page, StoreError>;

    /// Persists `page` and returns the stored aggregate.
    async fn save(&self, page: Page) -> Result<Arc<Page>, StoreError>;
}

#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Returns every block nested under `page`, in attachment order.
    async fn load_page_blocks(&self, page: &Page) -> Result<Vec<Arc<Block>>, StoreError>;

    async fn block(&self, id: BlockId) -> Result<Option<Arc<Block>>, StoreError>;

    /// Creates and persists a new container block.
    async fn create_container(&self, params: NewContainerParams) -> Result<Arc<Block>, StoreError>;
}
