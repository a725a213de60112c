use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolguardError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
