//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish
//!   failure modes, in particular around token lifecycle operations.
//! - Map ClientError and ConfigError variants to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - The 100-range is reserved for auth lifecycle outcomes; scripts branch
//!   on them to decide between "log in again" and "give up".

use qcloud_client::ClientError;
use qcloud_config::ConfigError;

/// Structured exit codes for the qcloud binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed successfully.
    Success = 0,

    /// Unhandled or generic failure.
    GeneralError = 1,

    /// Configuration problem: unreadable file, unknown profile, bad value.
    ///
    /// Scripts should fix the configuration and not retry.
    ConfigError = 2,

    /// Request timed out.
    ///
    /// Scripts may retry, possibly with a larger `--request-timeout`.
    Timeout = 9,

    /// A lifecycle operation was called in a state that cannot satisfy it,
    /// such as refreshing with no refresh token on record.
    ///
    /// Scripts should run `qcloud auth login` and retry.
    PreconditionFailed = 100,

    /// The authorization server rejected a refresh; the session is dead.
    ///
    /// Scripts should run `qcloud auth login` and retry.
    RemoteRejected = 101,

    /// The server refused a revocation without a transport failure.
    ServerRejected = 102,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Timeout { .. } => ExitCode::Timeout,
            ClientError::Precondition { .. } => ExitCode::PreconditionFailed,
            ClientError::RemoteRejected { .. } => ExitCode::RemoteRejected,
            ClientError::ServerRejected { .. } => ExitCode::ServerRejected,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(_: &ConfigError) -> Self {
        ExitCode::ConfigError
    }
}

/// Extract an exit code from an `anyhow::Error` by downcasting to the typed
/// errors underneath. Errors no typed layer claims exit with the general
/// code.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        if let Some(client_err) = self.downcast_ref::<ClientError>() {
            return ExitCode::from(client_err);
        }
        if let Some(config_err) = self.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_err);
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn lifecycle_errors_map_to_the_100_range() {
        let err = anyhow::Error::from(ClientError::Precondition {
            reason: "no token".into(),
        });
        assert_eq!(err.exit_code(), ExitCode::PreconditionFailed);
        assert_eq!(err.exit_code().as_i32(), 100);

        let err = anyhow::Error::from(ClientError::RemoteRejected {
            reason: "invalid_grant".into(),
        });
        assert_eq!(err.exit_code().as_i32(), 101);

        let err = anyhow::Error::from(ClientError::ServerRejected {
            reason: "revocation refused".into(),
        });
        assert_eq!(err.exit_code().as_i32(), 102);
    }

    #[test]
    fn timeout_maps_to_nine() {
        let err = anyhow::Error::from(ClientError::Timeout {
            after: Duration::from_secs(60),
        });
        assert_eq!(err.exit_code().as_i32(), 9);
    }

    #[test]
    fn config_errors_map_to_two() {
        let err = anyhow::Error::from(ConfigError::ProfileNotFound {
            name: "prod".into(),
            path: "/etc/xdg/qcloud/qcloud.conf".into(),
        });
        assert_eq!(err.exit_code(), ExitCode::ConfigError);
    }

    #[test]
    fn unknown_errors_fall_back_to_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
