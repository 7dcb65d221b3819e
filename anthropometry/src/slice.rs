use crate::{MeasureErr, Result, hull::Point2};

/// A horizontal band of the body, `fraction` of the way up from the lowest vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSpec {
    pub fraction: f64,
    /// Vertices closer than this to the band's centre line (in cm) belong to it.
    pub half_thickness: f64,
}

impl SliceSpec {
    pub const fn new(fraction: f64, half_thickness: f64) -> Self {
        Self {
            fraction,
            half_thickness,
        }
    }
}

/// A vertex cloud converted to centimetres, with its vertical extent.
#[derive(Debug, Clone)]
pub struct BodyPoints {
    points: Vec<[f64; 3]>,
    min_y: f64,
    max_y: f64,
}

impl BodyPoints {
    /// Converts vertices given in metres, Y up.
    ///
    /// # Errors
    /// `MeasureErr::EmptyMesh` for no vertices and `MeasureErr::NonFinite` for NaN or
    /// infinite coordinates.
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Result<Self> {
        if vertices.is_empty() {
            return Err(MeasureErr::EmptyMesh);
        }

        let mut points = Vec::with_capacity(vertices.len());
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for (vertex, v) in vertices.iter().enumerate() {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(MeasureErr::NonFinite { vertex });
            }

            let p = v.map(|c| f64::from(c) * 100.0);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
            points.push(p);
        }

        Ok(Self {
            points,
            min_y,
            max_y,
        })
    }

    /// The vertical extent in cm.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// The points inside the band described by `spec`.
    pub fn slice(&self, spec: SliceSpec) -> Vec<[f64; 3]> {
        let centre = self.min_y + spec.fraction * self.height();
        self.points
            .iter()
            .filter(|p| (p[1] - centre).abs() < spec.half_thickness)
            .copied()
            .collect()
    }
}

/// Drops the vertical axis.
pub fn project_xz(points: &[[f64; 3]]) -> Vec<Point2> {
    points.iter().map(|p| [p[0], p[2]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_are_open_bands() {
        let body = BodyPoints::from_vertices(&[
            [0.0, 0.0, 0.0],
            [0.0, 0.25, 0.0],
            [0.0, 0.5, 0.0],
            [0.0, 0.75, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap();

        assert_eq!(body.height(), 100.0);
        assert_eq!(body.slice(SliceSpec::new(0.5, 25.0)).len(), 1);
        assert_eq!(body.slice(SliceSpec::new(0.5, 25.5)).len(), 3);
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert_eq!(BodyPoints::from_vertices(&[]).unwrap_err(), MeasureErr::EmptyMesh);
        assert_eq!(
            BodyPoints::from_vertices(&[[0.0, 0.0, 0.0], [f32::NAN, 1.0, 0.0]]).unwrap_err(),
            MeasureErr::NonFinite { vertex: 1 }
        );
    }
}
