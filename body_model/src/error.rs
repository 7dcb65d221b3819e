use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use safetensors::SafeTensorError;
use specs::BodyVariant;

/// The result type used in the body model crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Failures while loading or evaluating a body model.
#[derive(Debug)]
pub enum ModelErr {
    NotFound {
        variant: BodyVariant,
        path: PathBuf,
    },
    Io(io::Error),
    Format(SafeTensorError),
    UnsupportedDtype {
        tensor: &'static str,
        dtype: String,
    },
    ShapeMismatch {
        tensor: &'static str,
        got: Vec<usize>,
        expected: String,
    },
    FaceOutOfBounds {
        face: usize,
        index: i64,
        vertices: usize,
    },
    InvalidFaceIndex {
        face: usize,
        index: i64,
    },
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::NotFound { variant, path } => write!(
                f,
                "{variant} body model not found at {}, create it with `trainer convert`",
                path.display()
            ),
            ModelErr::Io(e) => write!(f, "io error: {e}"),
            ModelErr::Format(e) => write!(f, "invalid model file: {e}"),
            ModelErr::UnsupportedDtype { tensor, dtype } => {
                write!(f, "tensor {tensor} has unsupported dtype {dtype}")
            }
            ModelErr::ShapeMismatch {
                tensor,
                got,
                expected,
            } => write!(f, "tensor {tensor} has shape {got:?}, expected {expected}"),
            ModelErr::FaceOutOfBounds {
                face,
                index,
                vertices,
            } => write!(
                f,
                "face {face} references vertex {index} but the model has {vertices} vertices"
            ),
            ModelErr::InvalidFaceIndex { face, index } => {
                write!(f, "face {face} has index {index}, which is not a vertex index")
            }
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelErr::Io(e) => Some(e),
            ModelErr::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SafeTensorError> for ModelErr {
    fn from(value: SafeTensorError) -> Self {
        Self::Format(value)
    }
}
