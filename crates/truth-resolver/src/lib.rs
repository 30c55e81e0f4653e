//! Alert-imagery resolution and caching.
//!
//! Given a geographic alert location, a date, and physical footprint
//! dimensions, [`ArtifactResolver`] produces two comparable satellite
//! products of the same ground footprint: a most-recent "final" scene and
//! a pre-alert cloud-free "reference" composite, each scored for cloud
//! contamination. [`CacheGateway`] wraps the resolver with idempotent,
//! request-id-keyed caching: fetched thumbnails land in blob storage and
//! repeated requests are served without touching the imagery service.
//!
//! The HTTP dispatch layer in front of this crate is external;
//! [`CacheGateway::resolve_and_cache`] is the entry point it consumes.

pub mod config;
pub mod fetch;
pub mod gateway;
pub mod resolver;

pub use config::ResolverConfig;
pub use fetch::{HttpFetcher, ThumbnailFetcher};
pub use gateway::CacheGateway;
pub use resolver::{ArtifactResolver, FINAL_SEARCH_DAYS, REFERENCE_WINDOW_DAYS};
