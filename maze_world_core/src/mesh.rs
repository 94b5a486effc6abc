//! Vertex ranges of the models packed into the shared vertex buffer.
//!
//! Each model description is a float count followed by that many floats,
//! eight per vertex (position, texture coordinate, normal). Models are
//! concatenated in [`ModelKind::LOAD_ORDER`], so a model's first vertex is
//! the sum of the vertex counts before it.

use serde::{Deserialize, Serialize};

use crate::scene::EntityKind;

pub const FLOATS_PER_VERTEX: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelFormatError {
    #[error("Model description is empty")]
    Empty,
    #[error("Model float count '{0}' is not a non-negative integer")]
    InvalidCount(String),
    #[error("Model token {index} ('{token}') is not a number")]
    InvalidFloat { index: usize, token: String },
    #[error("Model declares {declared} floats but supplies {found}")]
    CountMismatch { declared: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Teapot,
    Knot,
    Cube,
    Sphere,
}

impl ModelKind {
    pub const LOAD_ORDER: [ModelKind; 4] = [
        ModelKind::Teapot,
        ModelKind::Knot,
        ModelKind::Cube,
        ModelKind::Sphere,
    ];

    pub fn for_entity(kind: EntityKind) -> ModelKind {
        match kind {
            EntityKind::Floor | EntityKind::Wall | EntityKind::Door => ModelKind::Cube,
            EntityKind::Player => ModelKind::Knot,
            EntityKind::Key => ModelKind::Teapot,
        }
    }

    /// File the model's description is stored in.
    pub fn file_name(self) -> &'static str {
        match self {
            ModelKind::Teapot => "teapot.txt",
            ModelKind::Knot => "knot.txt",
            ModelKind::Cube => "cube.txt",
            ModelKind::Sphere => "sphere.txt",
        }
    }

    const fn index(self) -> usize {
        match self {
            ModelKind::Teapot => 0,
            ModelKind::Knot => 1,
            ModelKind::Cube => 2,
            ModelKind::Sphere => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRange {
    pub start_vertex: usize,
    pub vertex_count: usize,
}

/// Reads a model description and returns how many whole vertices it holds.
///
/// The floats themselves belong to the renderer; only their count is checked.
/// A trailing partial vertex is dropped.
pub fn parse_model_header(description: &str) -> Result<usize, ModelFormatError> {
    let mut tokens = description.split_whitespace();
    let head = tokens.next().ok_or(ModelFormatError::Empty)?;
    let declared: usize = head
        .parse()
        .map_err(|_| ModelFormatError::InvalidCount(head.to_string()))?;

    let mut found = 0;
    for (index, token) in tokens.enumerate() {
        token
            .parse::<f32>()
            .map_err(|_| ModelFormatError::InvalidFloat {
                index: index + 1,
                token: token.to_string(),
            })?;
        found += 1;
    }
    if found != declared {
        return Err(ModelFormatError::CountMismatch { declared, found });
    }
    Ok(declared / FLOATS_PER_VERTEX)
}

/// Vertex range for every model, and through it for every entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshLibrary {
    ranges: [MeshRange; 4],
}

impl MeshLibrary {
    /// Lays models out back to back, given their vertex counts in load order.
    pub fn from_vertex_counts(counts: [usize; 4]) -> Self {
        let mut ranges = [MeshRange::default(); 4];
        let mut start_vertex = 0;
        for (range, vertex_count) in ranges.iter_mut().zip(counts) {
            *range = MeshRange {
                start_vertex,
                vertex_count,
            };
            start_vertex += vertex_count;
        }
        MeshLibrary { ranges }
    }

    /// Parses the four model descriptions, in load order.
    pub fn from_descriptions(descriptions: [&str; 4]) -> Result<Self, ModelFormatError> {
        let mut counts = [0; 4];
        for (count, description) in counts.iter_mut().zip(descriptions) {
            *count = parse_model_header(description)?;
        }
        Ok(MeshLibrary::from_vertex_counts(counts))
    }

    #[inline]
    pub fn model(&self, kind: ModelKind) -> MeshRange {
        self.ranges[kind.index()]
    }

    #[inline]
    pub fn for_entity(&self, kind: EntityKind) -> MeshRange {
        self.model(ModelKind::for_entity(kind))
    }

    pub fn total_vertices(&self) -> usize {
        self.ranges.iter().map(|range| range.vertex_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_contiguous_in_load_order() {
        let library = MeshLibrary::from_vertex_counts([10, 20, 36, 5]);
        assert_eq!(
            library.model(ModelKind::Teapot),
            MeshRange {
                start_vertex: 0,
                vertex_count: 10
            }
        );
        assert_eq!(library.model(ModelKind::Knot).start_vertex, 10);
        assert_eq!(library.model(ModelKind::Cube).start_vertex, 30);
        assert_eq!(library.model(ModelKind::Sphere).start_vertex, 66);
        assert_eq!(library.total_vertices(), 71);
    }

    #[test]
    fn entities_share_the_cube() {
        let library = MeshLibrary::from_vertex_counts([1, 2, 3, 4]);
        let cube = library.model(ModelKind::Cube);
        assert_eq!(library.for_entity(EntityKind::Floor), cube);
        assert_eq!(library.for_entity(EntityKind::Wall), cube);
        assert_eq!(library.for_entity(EntityKind::Door), cube);
        assert_eq!(
            library.for_entity(EntityKind::Player),
            library.model(ModelKind::Knot)
        );
        assert_eq!(
            library.for_entity(EntityKind::Key),
            library.model(ModelKind::Teapot)
        );
    }

    #[test]
    fn header_counts_whole_vertices() {
        let one_vertex = "8\n0 0 0 0.5 0.5 0 1 0";
        assert_eq!(parse_model_header(one_vertex), Ok(1));
        assert_eq!(parse_model_header("0"), Ok(0));
        assert_eq!(parse_model_header("10 1 2 3 4 5 6 7 8 9 10"), Ok(1));
    }

    #[test]
    fn header_errors() {
        assert_eq!(parse_model_header(""), Err(ModelFormatError::Empty));
        assert_eq!(
            parse_model_header("-8"),
            Err(ModelFormatError::InvalidCount("-8".to_string()))
        );
        assert_eq!(
            parse_model_header("2 1.0"),
            Err(ModelFormatError::CountMismatch {
                declared: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_model_header("1 nope"),
            Err(ModelFormatError::InvalidFloat {
                index: 1,
                token: "nope".to_string()
            })
        );
    }

    #[test]
    fn library_from_descriptions() {
        let cube = format!("16 {}", "1 ".repeat(16));
        let library =
            MeshLibrary::from_descriptions(["8 1 1 1 1 1 1 1 1", "0", cube.as_str(), "0"]).unwrap();
        assert_eq!(library.model(ModelKind::Cube).start_vertex, 1);
        assert_eq!(library.model(ModelKind::Cube).vertex_count, 2);
        assert!(MeshLibrary::from_descriptions(["", "0", "0", "0"]).is_err());
    }
}
