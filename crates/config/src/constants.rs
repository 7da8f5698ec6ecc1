//! Centralized constants for the qcloud workspace.
//!
//! Only endpoints and the region carry built-in defaults; every other
//! configuration option defaults to empty/none at resolution time.

use std::time::Duration;

/// Default solver API endpoint.
pub const DEFAULT_SOLVER_API_ENDPOINT: &str = "https://cloud.qpucloud.io/sapi/";

/// Default metadata API endpoint (region discovery).
pub const DEFAULT_METADATA_API_ENDPOINT: &str = "https://cloud.qpucloud.io/metadata/v1/";

/// Default Leap API endpoint (OAuth and account operations).
pub const DEFAULT_LEAP_API_ENDPOINT: &str = "https://cloud.qpucloud.io/leap/api/";

/// Default API region.
pub const DEFAULT_REGION: &str = "na-west-1";

/// Configuration file name, identical across all scopes.
pub const CONFIG_FILE_NAME: &str = "qcloud.conf";

/// Application directory name used for user-scope config and data paths.
pub const APP_DIR_NAME: &str = "qcloud";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum allowed age of cached region metadata (1 day).
pub const DEFAULT_REGIONS_CACHE_MAXAGE: Duration = Duration::from_secs(86400);

/// Buffer before access-token expiry within which a token counts as expiring.
pub const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);
