fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Smooth per vertex normals, each face contributing in proportion to its area.
///
/// Vertices touched by no face, or only by degenerate ones, point up the Y axis. Faces
/// must already be bounds checked.
pub fn vertex_normals(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut acc = vec![[0.0f32; 3]; vertices.len()];

    for &[a, b, c] in faces {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        // The cross product's length is twice the face area.
        let n = cross(sub(vertices[b], vertices[a]), sub(vertices[c], vertices[a]));
        for v in [a, b, c] {
            for axis in 0..3 {
                acc[v][axis] += n[axis];
            }
        }
    }

    acc.into_iter()
        .map(|n| {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > f32::EPSILON {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_quad_points_along_z() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let faces = [[0, 1, 2], [0, 2, 3]];
        for n in vertex_normals(&vertices, &faces) {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn larger_faces_weigh_more() {
        // Shared edge 0-1, a big face in the XY plane and a small one in the XZ plane.
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, -1.0],
        ];
        let faces = [[0, 1, 2], [0, 1, 3]];
        let n = vertex_normals(&vertices, &faces)[0];
        assert!(n[2] > n[1].abs() * 5.0);
        assert_eq!(vertex_normals(&vertices, &[])[2], [0.0, 1.0, 0.0]);
    }
}
