use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors the engine can actually report.
///
/// Almost nothing in the pairing core is a fault: unauthorized access,
/// double reports, and blocks without a partner all degrade to no-ops
/// or fixed notices. What remains is malformed moderator input and
/// configuration loading.
#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Invalid user id: '{input}'")]
    #[diagnostic(
        code(palaver_core::invalid_user_id),
        help("Moderator commands take a numeric id, e.g. `/revoke 1000`")
    )]
    InvalidUserId { input: String },

    #[error("Failed to read config file '{path}'")]
    #[diagnostic(
        code(palaver_core::config_read_failed),
        help("Check that the file exists and is readable")
    )]
    ConfigReadFailed {
        path: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("Failed to parse config file '{path}'")]
    #[diagnostic(
        code(palaver_core::config_parse_failed),
        help("Check the TOML syntax; see `palaver.toml.example` for the expected shape")
    )]
    ConfigParseFailed {
        path: String,
        #[source]
        cause: toml::de::Error,
    },
}
