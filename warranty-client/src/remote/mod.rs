//! Remote project access: tables, object storage, reachability

pub mod blob;
pub mod http;
pub mod reachability;
pub mod records;

pub use blob::{BlobStore, StorageBucketClient, buckets};
pub use http::{AuthToken, RestClient};
pub use reachability::{FixedReachability, HttpReachability, Reachability};
pub use records::{PostgrestStore, Query, RemoteRecordStore};
