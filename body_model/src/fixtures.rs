//! A procedural stand-in for a real body model file.
//!
//! The body is a stack of circular rings, one per centimetre from the floor to 1.75 m,
//! with a radius profile that puts chest, waist, hips, shoulders and neck where the
//! measurement slices look for them. Beta 0 scales girth, beta 1 scales height and the
//! other components have no effect.

use ndarray::{Array2, Array3};
use specs::BodyVariant;

use crate::{NUM_BETAS, SmplModel};

/// Vertices per ring.
pub const RING_SEGMENTS: usize = 24;

/// Number of rings, the top one sits at exactly 1.75 m.
pub const RINGS: usize = 176;

/// The girth blend shape scales radii by this much per unit of beta 0.
pub const GIRTH_PER_BETA: f32 = 0.1;

/// The height blend shape scales y by this much per unit of beta 1.
pub const HEIGHT_PER_BETA: f32 = 0.05;

// (fraction of height, radius in cm), linearly interpolated.
const PROFILE: [(f32, f32); 15] = [
    (0.0, 6.0),
    (0.05, 6.0),
    (0.45, 15.0),
    (0.48, 15.6),
    (0.555, 15.6),
    (0.565, 12.7),
    (0.635, 12.7),
    (0.715, 15.1),
    (0.785, 15.1),
    (0.8, 22.5),
    (0.84, 22.5),
    (0.86, 12.1),
    (0.895, 12.1),
    (0.91, 9.0),
    (1.0, 9.0),
];

fn radius_at(fraction: f32) -> f32 {
    for pair in PROFILE.windows(2) {
        let ((f0, r0), (f1, r1)) = (pair[0], pair[1]);
        if fraction <= f1 {
            let t = ((fraction - f0) / (f1 - f0)).clamp(0.0, 1.0);
            return r0 + t * (r1 - r0);
        }
    }
    PROFILE[PROFILE.len() - 1].1
}

/// Builds the ring body for `variant`.
pub fn ring_body(variant: BodyVariant) -> SmplModel {
    let n = RINGS * RING_SEGMENTS;
    let mut template = Array2::zeros((n, 3));
    let mut shapedirs = Array3::zeros((n, 3, NUM_BETAS));

    for ring in 0..RINGS {
        let y = ring as f32 / 100.0;
        let radius = radius_at(ring as f32 / (RINGS - 1) as f32) / 100.0;

        for segment in 0..RING_SEGMENTS {
            let theta = segment as f32 / RING_SEGMENTS as f32 * std::f32::consts::TAU;
            let (x, z) = (radius * theta.cos(), radius * theta.sin());
            let v = ring * RING_SEGMENTS + segment;

            template[[v, 0]] = x;
            template[[v, 1]] = y;
            template[[v, 2]] = z;

            shapedirs[[v, 0, 0]] = GIRTH_PER_BETA * x;
            shapedirs[[v, 2, 0]] = GIRTH_PER_BETA * z;
            shapedirs[[v, 1, 1]] = HEIGHT_PER_BETA * y;
        }
    }

    let mut faces = Vec::with_capacity((RINGS - 1) * RING_SEGMENTS * 2);
    for ring in 0..RINGS - 1 {
        for segment in 0..RING_SEGMENTS {
            let next = (segment + 1) % RING_SEGMENTS;
            let a = (ring * RING_SEGMENTS + segment) as u32;
            let b = (ring * RING_SEGMENTS + next) as u32;
            let c = a + RING_SEGMENTS as u32;
            let d = b + RING_SEGMENTS as u32;
            faces.push([a, c, b]);
            faces.push([b, c, d]);
        }
    }

    match SmplModel::from_parts(variant, template, shapedirs, faces) {
        Ok(model) => model,
        Err(e) => panic!("ring body fixture is inconsistent: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Betas, BodyModel};

    #[test]
    fn spans_exactly_one_seventy_five() {
        let mesh = ring_body(BodyVariant::Neutral).evaluate(&Betas::zeros()).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min[1], 0.0);
        assert_eq!(max[1], 1.75);
    }

    #[test]
    fn height_beta_stretches_vertically() {
        let mut betas = [0.0; NUM_BETAS];
        betas[1] = 2.0;
        let mesh = ring_body(BodyVariant::Male).evaluate(&Betas::new(betas)).unwrap();
        let (_, max) = mesh.bounds().unwrap();
        assert!((max[1] - 1.925).abs() < 1e-5);
    }
}
