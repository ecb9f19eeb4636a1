//! In-memory store adapters for tests and storage-free embedding.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use time::OffsetDateTime;

use crate::application::stores::{
    BlockStore, NewContainerParams, NewPageParams, PageCriteria, PageStore, StoreError,
};
use crate::domain::blocks::{Block, BlockId, NAME_SETTING};
use crate::domain::pages::{Page, PageId};

/// Page storage backed by a shared map.
#[derive(Default)]
pub struct InMemoryPageStore {
    pages: DashMap<PageId, Arc<Page>>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a page, returning the shared handle.
    pub fn insert(&self, page: Page) -> Arc<Page> {
        let page = Arc::new(page);
        self.pages.insert(page.id, Arc::clone(&page));
        page
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    async fn find_one(&self, criteria: &PageCriteria) -> Result<Option<Arc<Page>>, StoreError> {
        match criteria {
            PageCriteria::Id(id) => Ok(self.pages.get(id).map(|entry| Arc::clone(entry.value()))),
            PageCriteria::Field { site, field, value } => Ok(self
                .pages
                .iter()
                .find(|entry| {
                    let page = entry.value();
                    site.is_none_or(|site| page.site == site)
                        && page.locator_value(*field) == Some(value.as_str())
                })
                .map(|entry| Arc::clone(entry.value()))),
        }
    }

    async fn create(&self, params: NewPageParams) -> Result<Page, StoreError> {
        Ok(Page {
            id: PageId::random(),
            site: params.site,
            url: params.url,
            route_name: params.route_name,
            name: params.name,
            ancestors: Vec::new(),
            blocks: Vec::new(),
            decorate: params.decorate,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    async fn save(&self, page: Page) -> Result<Arc<Page>, StoreError> {
        Ok(self.insert(page))
    }
}

/// Block storage backed by shared maps, keyed by page and by id.
#[derive(Default)]
pub struct InMemoryBlockStore {
    by_page: DashMap<PageId, Vec<Arc<Block>>>,
    by_id: DashMap<BlockId, Arc<Block>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a block under its owning page, returning the shared handle.
    pub fn insert(&self, block: Block) -> Arc<Block> {
        let block = Arc::new(block);
        self.by_id.insert(block.id, Arc::clone(&block));
        self.by_page
            .entry(block.page)
            .or_default()
            .push(Arc::clone(&block));
        block
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn load_page_blocks(&self, page: &Page) -> Result<Vec<Arc<Block>>, StoreError> {
        Ok(self
            .by_page
            .get(&page.id)
            .map(|blocks| blocks.clone())
            .unwrap_or_default())
    }

    async fn block(&self, id: BlockId) -> Result<Option<Arc<Block>>, StoreError> {
        Ok(self.by_id.get(&id).map(|entry| Arc::clone(entry.value())))
    }

    async fn create_container(&self, params: NewContainerParams) -> Result<Arc<Block>, StoreError> {
        let mut settings = BTreeMap::new();
        settings.insert(NAME_SETTING.to_string(), Value::String(params.name));

        Ok(self.insert(Block {
            id: BlockId::random(),
            page: params.page,
            parent: params.parent,
            settings,
            enabled: params.enabled,
            position: params.position,
            created_at: OffsetDateTime::now_utc(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pages::{PageField, SiteId};

    fn sample_page(site: SiteId, url: &str) -> Page {
        Page {
            id: PageId::random(),
            site,
            url: Some(url.to_string()),
            route_name: None,
            name: None,
            ancestors: Vec::new(),
            blocks: Vec::new(),
            decorate: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn field_lookups_are_scoped_by_site() {
        let store = InMemoryPageStore::new();
        let site_a = SiteId::random();
        let site_b = SiteId::random();
        store.insert(sample_page(site_a, "/about"));

        let criteria = |site| PageCriteria::Field {
            site: Some(site),
            field: PageField::Url,
            value: "/about".to_string(),
        };

        assert!(store.find_one(&criteria(site_a)).await.unwrap().is_some());
        assert!(store.find_one(&criteria(site_b)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn created_pages_are_not_visible_until_saved() {
        let store = InMemoryPageStore::new();
        let page = store
            .create(NewPageParams {
                site: SiteId::random(),
                url: None,
                route_name: Some("_page_internal_home".to_string()),
                name: Some("Internal Page: home".to_string()),
                decorate: false,
            })
            .await
            .unwrap();
        let id = page.id;

        assert!(store.find_one(&PageCriteria::Id(id)).await.unwrap().is_none());
        store.save(page).await.unwrap();
        assert!(store.find_one(&PageCriteria::Id(id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn blocks_load_in_attachment_order() {
        let store = InMemoryBlockStore::new();
        let page = sample_page(SiteId::random(), "/");

        let first = store
            .create_container(NewContainerParams {
                enabled: true,
                page: page.id,
                name: "header".to_string(),
                position: 1,
                parent: None,
            })
            .await
            .unwrap();
        let second = store
            .create_container(NewContainerParams {
                enabled: true,
                page: page.id,
                name: "content".to_string(),
                position: 2,
                parent: None,
            })
            .await
            .unwrap();

        let loaded = store.load_page_blocks(&page).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(Arc::ptr_eq(&loaded[0], &first));
        assert!(Arc::ptr_eq(&loaded[1], &second));
        assert_eq!(loaded[0].container_name(), Some("header"));
    }
}
