use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VteError {
    #[error("custom palette must have {expected} entries, got {got}")]
    InvalidPaletteSize { expected: usize, got: usize },
}
