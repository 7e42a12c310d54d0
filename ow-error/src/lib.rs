//! Unified error handling for Onewire Logger
//!
//! This crate provides a single error type used across all Onewire Logger components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Result type alias using OnewireError
pub type Result<T> = std::result::Result<T, OnewireError>;

/// Unified error type for all Onewire Logger operations
#[derive(thiserror::Error, Debug)]
pub enum OnewireError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to list directory {path}: {source}")]
    DirectoryList {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Invalid output pattern {pattern:?}: {reason}")]
    OutputPattern {
        pattern: String,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Process and Driver Errors
    // ============================================================================
    #[error("Failed to bind instance guard on {addr}: {source}")]
    InstanceBind {
        addr: SocketAddr,
        source: io::Error,
    },

    #[error("Failed to load kernel module: {0}")]
    ModuleLoad(String),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl OnewireError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an output pattern error
    pub fn output_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OutputPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a file write error
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}
