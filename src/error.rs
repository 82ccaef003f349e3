use gridmap_rules::LoadError;
use gridmap_solver::WfcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule File Error: {0}")]
    Rules(#[from] LoadError),

    #[error("Mask Error: line {line}, column {column}: {message}")]
    Mask {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Solver Error: {0}")]
    Solver(#[from] WfcError),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}
