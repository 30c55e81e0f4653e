//! Storage collaborators for the resolution pipeline.
//!
//! Two opaque stores sit behind trait seams here:
//! - a content-addressable blob store (MinIO/S3) holding fetched thumbnail
//!   bytes
//! - a durable get/put-by-key cache holding resolved artifact bundles

pub mod blob;
pub mod bundle_cache;

pub use blob::{BlobPath, BlobStore, ObjectStorage, ObjectStorageConfig, THUMBNAIL_CONTENT_TYPE};
pub use bundle_cache::{BundleCache, CacheRecord, RedisBundleCache};
