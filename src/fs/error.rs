use crate::dev::DeviceError;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("no such file or directory")]
    NotFound,

    #[error("not a directory")]
    NotADirectory,

    #[error("not a file")]
    NotAFile,

    #[error("no space left on device")]
    NoSpace,

    #[error("invalid name")]
    InvalidName,

    #[error("file too large")]
    FileTooLarge,

    #[error("directory not empty")]
    NotEmpty,

    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

pub type FsResult<T> = Result<T, FsError>;
