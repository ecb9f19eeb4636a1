//! Request-scoped page resolution and caching.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::blocks::{Block, BlockId};
use crate::domain::pages::{Page, PageField, PageId, PageLocator, SiteId};

use super::error::ResolverError;
use super::stores::{BlockStore, NewPageParams, PageCriteria, PageStore};

/// Route-name prefix given to internal pages.
const INTERNAL_ROUTE_PREFIX: &str = "_page_internal_";

/// Internal page names may not shadow error-handling routes.
const RESERVED_NAME_PREFIX: &str = "error";

#[derive(Clone, Copy)]
enum LookupKey<'a> {
    Id(PageId),
    Field { field: PageField, value: &'a str },
}

impl LookupKey<'_> {
    fn criteria(&self, site: Option<SiteId>) -> PageCriteria {
        match self {
            LookupKey::Id(id) => PageCriteria::Id(*id),
            LookupKey::Field { field, value } => PageCriteria::Field {
                site,
                field: *field,
                value: (*value).to_string(),
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            LookupKey::Id(id) => format!("id = {id}"),
            LookupKey::Field { field, value } => format!("{field} = {value}"),
        }
    }
}

/// Resolves pages by locator and memoizes the results for its own lifetime.
///
/// One resolver serves one logical request: its caches are plain owned state
/// behind `&mut self`, never shared across requests. Store calls are the only
/// suspension points; the resolver takes no locks and performs no retries.
///
/// Resolving a page eagerly loads every block nested under it into the block
/// cache, so templates and [`ContainerLocator`](super::containers::ContainerLocator)
/// callers read blocks without further store round-trips.
pub struct PageResolver {
    page_store: Arc<dyn PageStore>,
    block_store: Arc<dyn BlockStore>,
    /// field → value → id; positive resolutions only.
    references: HashMap<PageField, HashMap<String, PageId>>,
    /// Materialized pages. `None` marks a lookup currently in flight.
    pages: HashMap<PageId, Option<Arc<Page>>>,
    blocks: HashMap<BlockId, Arc<Block>>,
    current: Option<Arc<Page>>,
}

impl PageResolver {
    pub fn new(page_store: Arc<dyn PageStore>, block_store: Arc<dyn BlockStore>) -> Self {
        Self {
            page_store,
            block_store,
            references: HashMap::new(),
            pages: HashMap::new(),
            blocks: HashMap::new(),
            current: None,
        }
    }

    pub async fn resolve_by_url(
        &mut self,
        site: SiteId,
        url: &str,
    ) -> Result<Arc<Page>, ResolverError> {
        self.lookup(
            Some(site),
            LookupKey::Field {
                field: PageField::Url,
                value: url,
            },
        )
        .await
    }

    pub async fn resolve_by_route_name(
        &mut self,
        site: SiteId,
        route_name: &str,
    ) -> Result<Arc<Page>, ResolverError> {
        self.lookup(
            Some(site),
            LookupKey::Field {
                field: PageField::RouteName,
                value: route_name,
            },
        )
        .await
    }

    pub async fn resolve_by_name(
        &mut self,
        site: SiteId,
        name: &str,
    ) -> Result<Arc<Page>, ResolverError> {
        self.lookup(
            Some(site),
            LookupKey::Field {
                field: PageField::Name,
                value: name,
            },
        )
        .await
    }

    pub async fn resolve_by_id(&mut self, id: PageId) -> Result<Arc<Page>, ResolverError> {
        self.lookup(None, LookupKey::Id(id)).await
    }

    /// Resolves a page from an explicit locator.
    pub async fn resolve(
        &mut self,
        site: SiteId,
        locator: &PageLocator,
    ) -> Result<Arc<Page>, ResolverError> {
        match locator {
            PageLocator::Path(path) => self.resolve_by_url(site, path).await,
            PageLocator::Route(route) => self.resolve_by_route_name(site, route).await,
            PageLocator::Id(id) => self.resolve_by_id(*id).await,
            PageLocator::Current => self
                .current
                .clone()
                .ok_or_else(|| ResolverError::PageNotFound("no active page".to_string())),
        }
    }

    /// Returns the page backing the internal route `name`, creating and
    /// persisting it when absent.
    ///
    /// This is the only place the resolver writes through to page storage.
    pub async fn resolve_internal_route(
        &mut self,
        site: SiteId,
        name: &str,
    ) -> Result<Arc<Page>, ResolverError> {
        if name.starts_with(RESERVED_NAME_PREFIX) {
            return Err(ResolverError::ReservedInternalName(name.to_string()));
        }

        let route_name = format!("{INTERNAL_ROUTE_PREFIX}{name}");

        match self.resolve_by_route_name(site, &route_name).await {
            Ok(page) => Ok(page),
            Err(ResolverError::PageNotFound(_)) => {
                debug!(route_name = %route_name, "internal route has no page, creating one");
                let page = self
                    .page_store
                    .create(NewPageParams {
                        site,
                        url: None,
                        route_name: Some(route_name),
                        name: Some(format!("Internal Page: {name}")),
                        decorate: false,
                    })
                    .await?;
                Ok(self.page_store.save(page).await?)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns a block by id, fetching it on cache miss. Found blocks are
    /// cached; misses are re-queried on the next call.
    pub async fn block_by_id(&mut self, id: BlockId) -> Result<Option<Arc<Block>>, ResolverError> {
        if let Some(block) = self.blocks.get(&id) {
            return Ok(Some(Arc::clone(block)));
        }

        let fetched = self.block_store.block(id).await?;
        if let Some(block) = &fetched {
            self.blocks.insert(id, Arc::clone(block));
        }
        Ok(fetched)
    }

    pub fn current_page(&self) -> Option<&Arc<Page>> {
        self.current.as_ref()
    }

    pub fn set_current_page(&mut self, page: Arc<Page>) {
        self.current = Some(page);
    }

    /// Every block materialized by this resolver so far.
    pub fn loaded_blocks(&self) -> Vec<Arc<Block>> {
        self.blocks.values().cloned().collect()
    }

    async fn lookup(
        &mut self,
        site: Option<SiteId>,
        key: LookupKey<'_>,
    ) -> Result<Arc<Page>, ResolverError> {
        let known_id = match &key {
            LookupKey::Id(id) => Some(*id),
            LookupKey::Field { field, value } => self
                .references
                .get(field)
                .and_then(|by_value| by_value.get(*value))
                .copied(),
        };

        if let Some(id) = known_id {
            if let Some(Some(page)) = self.pages.get(&id) {
                return Ok(Arc::clone(page));
            }
            // In-flight marker: a reentrant lookup for this id must not
            // mistake the pending slot for a cached page.
            self.pages.insert(id, None);
        }

        let criteria = key.criteria(site);
        debug!(?criteria, "page cache miss, querying store");

        let found = match self.page_store.find_one(&criteria).await {
            Ok(found) => found,
            Err(err) => {
                if let Some(id) = known_id {
                    self.pages.remove(&id);
                }
                return Err(err.into());
            }
        };

        let Some(page) = found else {
            // Misses are not memoized: drop the in-flight marker so the next
            // attempt queries the store again.
            if let Some(id) = known_id {
                self.pages.remove(&id);
            }
            return Err(ResolverError::PageNotFound(key.describe()));
        };

        self.load_blocks(&page).await?;

        if let LookupKey::Field { field, value } = key {
            self.references
                .entry(field)
                .or_default()
                .insert(value.to_string(), page.id);
        }
        self.pages.insert(page.id, Some(Arc::clone(&page)));

        Ok(page)
    }

    /// Loads every block nested under `page` into the block cache.
    async fn load_blocks(&mut self, page: &Page) -> Result<(), ResolverError> {
        let blocks = self.block_store.load_page_blocks(page).await?;
        debug!(page = %page.id, count = blocks.len(), "loaded page blocks");

        for block in blocks {
            self.blocks.insert(block.id, block);
        }
        Ok(())
    }
}
