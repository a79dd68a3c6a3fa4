use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Required column '{column}' missing from table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("Unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
