use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid quantity {0:?}: {1}")]
    QuantityParseError(String, &'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
