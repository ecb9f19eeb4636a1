//! Content blocks attached to pages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::pages::PageId;

/// Settings key holding a container block's identifier.
pub const NAME_SETTING: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
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

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A content fragment attached to a page.
///
/// Settings are free-form JSON keyed by unique names. A block functions as a
/// container when its [`NAME_SETTING`] matches a structural slot requested by
/// a template; that name is unique among the blocks directly attached to one
/// page, not globally.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub id: BlockId,
    /// The owning page.
    pub page: PageId,
    /// Enclosing block, when nested.
    pub parent: Option<BlockId>,
    pub settings: BTreeMap<String, Value>,
    pub enabled: bool,
    /// Sort order among siblings.
    pub position: i32,
    pub created_at: OffsetDateTime,
}

impl Block {
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key)?.as_str()
    }

    /// Container identifier, when this block functions as a container.
    pub fn container_name(&self) -> Option<&str> {
        self.setting_str(NAME_SETTING)
    }
}
