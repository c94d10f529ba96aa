use thiserror::Error;

/// Errors raised while validating generator input.
#[derive(Debug, Error, PartialEq)]
pub enum KochError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output would hold `3 * 4^depth` vertices.
    #[error("depth {depth} exceeds the maximum of {max}")]
    ResourceExhaustion { depth: i64, max: u32 },
}

/// Errors raised while setting up GPU resources.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("gl: {0}")]
    Gl(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("program link failed: {0}")]
    ProgramLink(String),
}

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        Self::Gl(message)
    }
}
