//! Error codes and exit status for emilyctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the configuration or app registry cannot be loaded
pub const EXIT_CONFIG_ERROR: i32 = 64;

/// Exit code when the input reply cannot be read
pub const EXIT_INPUT_ERROR: i32 = 65;

/// Exit code when Home Assistant is needed but not enabled/configured
pub const EXIT_HOME_NOT_CONFIGURED: i32 = 70;

/// Error carrying a specific exit code through `anyhow`
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Map an error chain to a process exit code
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ExitError>())
        .map_or(EXIT_GENERAL_ERROR, |e| e.code)
}
