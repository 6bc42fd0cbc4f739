use std::{io, path::PathBuf};

use kindnet_cni_core::cni::{CniConfigBuilderError, CniConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Couldn't prepare the CNI configuration! Reason: {}", .0)]
    ConfigBuilderError(CniConfigBuilderError),
    #[error("Couldn't render the CNI configuration! Reason: {}", .0)]
    RenderError(CniConfigError),
    #[error("Couldn't create {0:?} directory! Reason: {1}")]
    CreateDirectoryError(PathBuf, io::Error),
    #[error("Couldn't write {0:?}! Reason: {1}")]
    WriteError(PathBuf, io::Error),
    #[error("Couldn't move the CNI configuration into {0:?}! Reason: {1}")]
    RenameError(PathBuf, io::Error),
}
