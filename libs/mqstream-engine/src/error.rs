use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("route '{route}' references unknown transformer '{transformer}'")]
    UnknownTransformer { route: String, transformer: String },

    #[error("duplicate route name '{0}'")]
    DuplicateRoute(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Add context to the error, prepended to the message where the
    /// variant carries one.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
