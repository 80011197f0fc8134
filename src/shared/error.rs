use thiserror::Error;

#[derive(Error, Debug)]
pub enum WbsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required file: {0}")]
    MissingFile(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Invalid project name: {0:?}")]
    InvalidProject(String),

    #[error("Project is locked by another writer: {0}")]
    ProjectLocked(String),
}

pub type Result<T> = std::result::Result<T, WbsError>;
