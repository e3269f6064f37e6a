use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    /// Starting a container or querying its host/ports failed.
    #[error("container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
