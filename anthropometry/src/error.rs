use std::{
    error::Error,
    fmt::{self, Display},
};

pub type Result<T> = std::result::Result<T, MeasureErr>;

#[derive(Debug, Clone, PartialEq)]
pub enum MeasureErr {
    EmptyMesh,
    NonFinite { vertex: usize },
    UnknownHeuristic(String),
}

impl Display for MeasureErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureErr::EmptyMesh => write!(f, "cannot measure a mesh without vertices"),
            MeasureErr::NonFinite { vertex } => {
                write!(f, "vertex {vertex} has a non finite coordinate")
            }
            MeasureErr::UnknownHeuristic(got) => {
                write!(f, "unknown heuristic {got:?}, expected geometric or proportional")
            }
        }
    }
}

impl Error for MeasureErr {}
