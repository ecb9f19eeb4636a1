//! Page aggregates and the locators used to resolve them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::blocks::Block;

/// Identifier of a site.
///
/// Sites are opaque to this crate beyond their id: a site scopes locator
/// uniqueness and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId(Uuid);

impl SiteId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Locator fields a page can be looked up by within a site.
///
/// Each field value, when present, is unique within one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageField {
    Url,
    RouteName,
    Name,
}

impl PageField {
    pub fn as_str(self) -> &'static str {
        match self {
            PageField::Url => "url",
            PageField::RouteName => "route_name",
            PageField::Name => "name",
        }
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caller identifies the page it wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLocator {
    /// A url path, e.g. `/about/team`.
    Path(String),
    /// An application route name.
    Route(String),
    /// A page id.
    Id(PageId),
    /// The resolver's active-page slot.
    Current,
}

/// A resolvable content page.
///
/// `ancestors` is ordered nearest ancestor first, most distant (root) last,
/// and never contains cycles. `blocks` holds the directly attached blocks in
/// attachment order; nested blocks live behind the block store.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    pub site: SiteId,
    pub url: Option<String>,
    pub route_name: Option<String>,
    /// Display name; also the `Name` locator field.
    pub name: Option<String>,
    pub ancestors: Vec<Arc<Page>>,
    pub blocks: Vec<Arc<Block>>,
    /// Whether this page participates in site decoration.
    pub decorate: bool,
    pub created_at: OffsetDateTime,
}

impl Page {
    /// The value this page carries for a locator field.
    pub fn locator_value(&self, field: PageField) -> Option<&str> {
        match field {
            PageField::Url => self.url.as_deref(),
            PageField::RouteName => self.route_name.as_deref(),
            PageField::Name => self.name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_values_map_to_fields() {
        let page = Page {
            id: PageId::random(),
            site: SiteId::random(),
            url: Some("/about".to_string()),
            route_name: Some("about".to_string()),
            name: None,
            ancestors: Vec::new(),
            blocks: Vec::new(),
            decorate: true,
            created_at: OffsetDateTime::now_utc(),
        };

        assert_eq!(page.locator_value(PageField::Url), Some("/about"));
        assert_eq!(page.locator_value(PageField::RouteName), Some("about"));
        assert_eq!(page.locator_value(PageField::Name), None);
    }
}
