//! Named container search across a page's ancestor chain, with lazy creation.

use std::sync::Arc;

use tracing::debug;

use crate::domain::blocks::Block;
use crate::domain::pages::Page;

use super::stores::{BlockStore, NewContainerParams, StoreError};

/// Position assigned to lazily created containers.
const CONTAINER_POSITION: i32 = 1;

/// Finds named container blocks for a page, creating them when absent.
///
/// Search order is the page itself, then its ancestors nearest to most
/// distant, first match wins. Lazy creation attaches the new container to the
/// most distant ancestor, or to the page itself when it has none: containers
/// live at the top of a page hierarchy while staying discoverable from every
/// descendant.
pub struct ContainerLocator {
    block_store: Arc<dyn BlockStore>,
}

impl ContainerLocator {
    pub fn new(block_store: Arc<dyn BlockStore>) -> Self {
        Self { block_store }
    }

    /// Returns the container named `name` for `page`, if one exists.
    ///
    /// An explicit `parent` short-circuits the search and is returned as-is;
    /// callers pass it when the container sits inside an already-resolved
    /// block.
    pub fn find(&self, name: &str, page: &Page, parent: Option<Arc<Block>>) -> Option<Arc<Block>> {
        if let Some(parent) = parent {
            return Some(parent);
        }

        if let Some(container) = block_named(name, page) {
            return Some(container);
        }

        page.ancestors
            .iter()
            .find_map(|ancestor| block_named(name, ancestor))
    }

    /// Returns the container named `name`, creating it when the search comes
    /// up empty.
    ///
    /// Creation is best-effort: two concurrent writers can each miss and
    /// create, and later reads resolve the duplicates first-match-wins. The
    /// result is never re-checked against the search.
    pub async fn find_or_create(
        &self,
        name: &str,
        page: &Page,
        parent: Option<Arc<Block>>,
    ) -> Result<Arc<Block>, StoreError> {
        if let Some(container) = self.find(name, page, parent) {
            return Ok(container);
        }

        let owner = page.ancestors.last().map_or(page.id, |root| root.id);
        debug!(container = name, page = %owner, "container missing, creating");

        self.block_store
            .create_container(NewContainerParams {
                enabled: true,
                page: owner,
                name: name.to_string(),
                position: CONTAINER_POSITION,
                parent: None,
            })
            .await
    }
}

/// First directly-attached block of `page` carrying `name` as its container
/// name, in attachment order.
fn block_named(name: &str, page: &Page) -> Option<Arc<Block>> {
    page.blocks
        .iter()
        .find(|block| block.container_name() == Some(name))
        .cloned()
}
