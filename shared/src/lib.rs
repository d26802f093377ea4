// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: invalid callback secret")]
    Forbidden,
    #[error("storage: {0}")]
    Storage(String),
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
