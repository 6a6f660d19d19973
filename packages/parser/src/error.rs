use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),
}
