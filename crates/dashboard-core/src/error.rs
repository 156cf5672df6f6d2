#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create patient directory: {0}")]
    PatientDirCreation(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("record error: {0}")]
    OpenMrs(#[from] openmrs::OpenMrsError),
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
