//! Logging helpers shared by the binary and the library.

use std::iter::successors;

/// Iterate over the `Display` representations of the sources of the given error
/// by recursively calling `std::error::Error::source()`.
pub fn iter_sources<T: std::error::Error + ?Sized>(
    error: &T,
) -> impl std::iter::Iterator<Item = String> + use<'_, T> {
    successors(error.source(), |&error| error.source()).map(ToString::to_string)
}

/// Separator used by `log_error!` and `error_chain` between error sources.
pub const SEP: &str = ": ";

/// The error message followed by all of its sources.
pub fn error_chain<T: std::error::Error + ?Sized>(error: &T) -> String {
    std::iter::once(error.to_string())
        .chain(iter_sources(error))
        .collect::<Vec<_>>()
        .join(SEP)
}

/// Emit an ERROR event carrying the error, its sources and its `Debug` form.
///
/// ```no_run
/// use reps_bootstrap::log_error;
///
/// let error = std::io::Error::other("borked");
/// log_error!(error);
/// log_error!(error, "oh no");
/// ```
#[macro_export]
macro_rules! log_error {
    ($error:expr, $msg:literal) => {
        tracing::error!(
            error = %$error,
            source = %$crate::o11y::iter_sources(&$error).collect::<Vec<_>>().join($crate::o11y::SEP),
            debug = ?$error,
            $msg
        )
    };

    ($error:expr) => {
        tracing::error!(
            error = %$error,
            source = %$crate::o11y::iter_sources(&$error).collect::<Vec<_>>().join($crate::o11y::SEP),
            debug = ?$error
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{BootstrapError, ConfigError};

    #[test]
    fn chain_includes_every_source() {
        let error = BootstrapError::from(ConfigError::MissingUrl);
        assert_eq!(
            error_chain(&error),
            "configuration error: DATABASE_URL or MONGODB_URL must be set"
        );
        assert_eq!(iter_sources(&error).count(), 1);
    }

    #[test]
    fn chain_of_leaf_error_is_its_message() {
        let error = ConfigError::EmptyUrl;
        assert_eq!(error_chain(&error), "connection string is empty");
    }
}
