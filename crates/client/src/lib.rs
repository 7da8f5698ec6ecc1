//! qcloud API client: cached region metadata and OAuth token lifecycle.
//!
//! This crate consumes a `qcloud_config::ResolvedConfig` and talks to the
//! metadata and Leap APIs. It owns the on-disk TTL cache for slowly-changing
//! remote lookups and the access/refresh token state machine. The HTTP
//! transport itself (retries, pooling) and the interactive parts of the
//! OAuth flows are collaborators behind traits.

pub mod api;
pub mod auth;
mod cache;
mod error;
mod regions;

pub use api::leap::{HttpLeapApi, LeapApi, LeapProject};
pub use api::metadata::{HttpMetadataApi, MetadataApi};
pub use api::oauth::{HttpOauthApi, OauthApi, PkceChallenge};
pub use auth::flows::OauthFlow;
pub use auth::manager::{AuthState, AuthTokenManager, LoginMode, LoginOutcome, TokenKind};
pub use auth::store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use auth::token::AuthToken;
pub use cache::{DiskCache, Fingerprint};
pub use error::{ClientError, Result};
pub use regions::{Region, RegionsService};
