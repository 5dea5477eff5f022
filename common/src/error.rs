use std::{backtrace::BacktraceStatus, error::Error as StdError, fmt::Write};

use anyhow::Error;
use simplelog::{debug, error, warn};

/// Flattens an error and all of its sources into `outer: inner: root`.
pub fn describe(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {}", cause);
        source = cause.source();
    }
    message
}

pub struct FancyError;

impl FancyError {
    /// Logs a failure of the service itself, e.g. while starting up or serving connections.
    pub fn print_fancy(error: &Error, critical: bool) {
        if critical {
            error!("vbump cannot continue: {}", describe(&**error));
        } else {
            error!("vbump keeps running after: {}", describe(&**error));
        }

        let backtrace = error.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            error!("Backtrace:");
            for line in backtrace.to_string().lines() {
                error!("{}", line);
            }
        } else {
            debug!("Run with `RUST_BACKTRACE=1` to capture a backtrace");
        }
    }

    /// Logs a request that could not be answered. Only failures on our side are errors.
    pub fn print_request(method: &str, path: &str, error: &dyn StdError, server_side: bool) {
        if server_side {
            error!("{} {} failed: {}", method, path, describe(error));
        } else {
            warn!("{} {} rejected: {}", method, path, describe(error));
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::describe;

    #[test]
    fn describe_joins_every_source() {
        let error = anyhow!("permission denied")
            .context("failed to store version of project p1")
            .context("bump failed");

        assert_eq!(
            describe(&*error),
            "bump failed: failed to store version of project p1: permission denied"
        );
    }

    #[test]
    fn describe_without_source() {
        let error = anyhow!("listener closed");

        assert_eq!(describe(&*error), "listener closed");
    }
}
