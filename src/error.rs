use std::path::{Path, PathBuf};

pub const RESOURCE_LOAD_FAILURE: &str = "RESOURCE_LOAD_FAILURE";
pub const MEASUREMENT_FAILURE: &str = "MEASUREMENT_FAILURE";
pub const SURFACE_ALLOCATION_FAILURE: &str = "SURFACE_ALLOCATION_FAILURE";
pub const ENCODE_FAILURE: &str = "ENCODE_FAILURE";

pub type DialogueResult<T> = Result<T, DialogueError>;

/// Failures of the render collaborators. Every variant aborts the whole render;
/// no partial frame sequence is ever returned alongside one of these.
#[derive(thiserror::Error, Debug)]
pub enum DialogueError {
    #[error("RESOURCE_LOAD_FAILURE: failed to load {kind} '{}': {reason}", .path.display())]
    ResourceLoad {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("MEASUREMENT_FAILURE: font '{face}' cannot measure {ch:?}")]
    Measurement { face: String, ch: char },

    #[error("SURFACE_ALLOCATION_FAILURE: cannot allocate {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("ENCODE_FAILURE: {0}")]
    Encode(String),
}

impl DialogueError {
    pub fn resource(kind: &'static str, path: &Path, reason: impl ToString) -> Self {
        Self::ResourceLoad {
            kind,
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn measurement(face: impl Into<String>, ch: char) -> Self {
        Self::Measurement {
            face: face.into(),
            ch,
        }
    }

    pub fn encode(reason: impl ToString) -> Self {
        Self::Encode(reason.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceLoad { .. } => RESOURCE_LOAD_FAILURE,
            Self::Measurement { .. } => MEASUREMENT_FAILURE,
            Self::SurfaceAllocation { .. } => SURFACE_ALLOCATION_FAILURE,
            Self::Encode(_) => ENCODE_FAILURE,
        }
    }
}

/// Finds a render failure anywhere in an `anyhow` chain so the CLI can report its code.
pub fn find_dialogue_error(error: &anyhow::Error) -> Option<&DialogueError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DialogueError>())
}
