//! Page resolution and layout decoration for self-hosted publishing
//! platforms.
//!
//! The crate sits between storage and rendering: [`PageResolver`] turns a
//! site plus a locator into a fully loaded page aggregate with
//! request-scoped caching, [`ContainerLocator`] finds or lazily creates named
//! container blocks across a page's ancestor chain, and
//! [`DecorationStrategy`] decides whether a response may be wrapped with site
//! chrome. Persistence stays behind the [`PageStore`] and [`BlockStore`]
//! traits; [`infra::memory`] ships in-memory adapters and [`infra::http`] an
//! axum middleware that tags responses with the decoration verdict.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::containers::ContainerLocator;
pub use application::decoration::{DECORABLE_HEADER, DecorationStrategy, RequestKind, RequestView};
pub use application::error::ResolverError;
pub use application::resolver::PageResolver;
pub use application::stores::{BlockStore, PageCriteria, PageStore, StoreError};
pub use config::DecorationRules;
pub use domain::blocks::{Block, BlockId};
pub use domain::pages::{Page, PageField, PageId, PageLocator, SiteId};
