use std::{
    error::Error,
    fmt::{self, Display},
};

pub type Result<T> = std::result::Result<T, ExportErr>;

#[derive(Debug)]
pub enum ExportErr {
    EmptyMesh { vertices: usize, faces: usize },
    FaceOutOfBounds { face: usize, index: u32, vertices: usize },
    NonFinite { vertex: usize },
    Json(serde_json::Error),
}

impl Display for ExportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportErr::EmptyMesh { vertices, faces } => write!(
                f,
                "cannot export a mesh with {vertices} vertices and {faces} faces"
            ),
            ExportErr::FaceOutOfBounds {
                face,
                index,
                vertices,
            } => write!(
                f,
                "face {face} references vertex {index} but the mesh has {vertices} vertices"
            ),
            ExportErr::NonFinite { vertex } => {
                write!(f, "vertex {vertex} has a non finite coordinate")
            }
            ExportErr::Json(e) => write!(f, "failed to encode glTF json: {e}"),
        }
    }
}

impl Error for ExportErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
