//! Warranty Pro client data layer
//!
//! Offline-tolerant access to sales, field visits, complaints and regional
//! stock. Records are read from and written to the remote project when it is
//! configured, with the on-device record store as fallback.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod remote;
pub mod services;
pub mod storage;
pub mod upload;

pub use backend::{Backend, RemoteBackend};
pub use client::WarrantyClient;
pub use config::{ClientConfig, RemoteConfig};
pub use error::{ClientError, ClientResult};
pub use upload::{AttachmentKind, ImageUploadPipeline, ProgressFn};

// Re-export shared types for convenience
pub use shared::models;
pub use shared::{AppError, ErrorCode};
