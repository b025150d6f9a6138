//! Application-level error type.
//!
//! Domain modules return their own typed errors; everything that reaches
//! `main` is converted into an `AppError` carrying a process exit code.

/// Bad input files, arguments or configuration.
pub const EXIT_INPUT: u8 = 2;
/// Article endpoint unreachable or returned garbage.
pub const EXIT_NETWORK: u8 = 3;
/// Terminal setup or drawing failed.
pub const EXIT_TERMINAL: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(EXIT_NETWORK, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(EXIT_TERMINAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::domain::SourceError> for AppError {
    fn from(err: crate::domain::SourceError) -> Self {
        AppError::input(err.to_string())
    }
}

impl From<crate::domain::MetricParseError> for AppError {
    fn from(err: crate::domain::MetricParseError) -> Self {
        AppError::input(err.to_string())
    }
}
