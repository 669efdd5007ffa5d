//! Client-side data synchronization for the ServiceLink marketplace API.
//!
//! The crate keeps a paginated, filterable resource browser consistent
//! with server-side mutations:
//!
//! - [`filter::FilterState`] snapshots the active search/pagination
//!   parameters and [`cache::QueryKey`] derives a canonical,
//!   order-independent cache identity from them.
//! - [`cache::CacheStore`] holds one version-fenced entry per key;
//!   [`client::fetcher::Fetcher`] reads through it with in-flight
//!   deduplication, and [`client::mutation::MutationCoordinator`]
//!   invalidates a whole resource family after a successful write.
//! - [`urlstate::UrlStateBinder`] keeps the state in the navigable
//!   address ([`history::Location`]), so reloading or sharing an address
//!   reproduces the same view.
//! - [`routing::route`] turns an authenticated identity's role set into
//!   the single post-sign-in destination.
//!
//! [`browser::ResourceBrowser`] ties these together for one list view.

pub mod auth;
pub mod browser;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod resource;
pub mod routing;
pub mod urlstate;

pub use auth::{AuthClient, AuthSession, Identity, RoleHint};
pub use browser::ResourceBrowser;
pub use cache::{CacheEntry, CacheEvent, CacheStore, FetchStatus, QueryKey};
pub use client::api_types::Page;
pub use client::fetcher::Fetcher;
pub use client::http::HttpTransport;
pub use client::mutation::{Mutation, MutationCoordinator};
pub use client::{Transport, Verb};
pub use config::Config;
pub use error::SyncError;
pub use filter::FilterState;
pub use history::{History, Location};
pub use resource::ResourceFamily;
pub use urlstate::UrlStateBinder;
