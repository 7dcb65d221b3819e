use std::{collections::HashMap, fs, path::Path};

use log::info;
use ndarray::{Array1, Array2, Array3, ArrayView1, s};
use safetensors::{Dtype, SafeTensors, tensor::TensorView};
use specs::BodyVariant;

use crate::{Betas, BodyMesh, BodyModel, ModelErr, NUM_BETAS, Result};

const TEMPLATE: &str = "v_template";
const SHAPEDIRS: &str = "shapedirs";
const FACES: &str = "f";

/// An SMPL style linear shape model.
///
/// In the neutral pose every joint transform is the identity, so the posed mesh is the
/// template displaced by the shape blend shapes: `v = v_template + shapedirs · betas`.
pub struct SmplModel {
    variant: BodyVariant,
    // (N, 3)
    template: Array2<f32>,
    // (N * 3, NUM_BETAS), row major over (vertex, axis).
    shapedirs: Array2<f32>,
    faces: Vec<[u32; 3]>,
}

impl SmplModel {
    /// Builds a model from its arrays.
    ///
    /// # Arguments
    /// * `variant` - The variant the arrays belong to.
    /// * `template` - The rest vertices, shape `(N, 3)`.
    /// * `shapedirs` - The shape blend shapes, shape `(N, 3, K)` with `K >= NUM_BETAS`.
    ///   Only the first `NUM_BETAS` components are kept.
    /// * `faces` - Triangles indexing into the template.
    ///
    /// # Errors
    /// `ModelErr::ShapeMismatch` or `ModelErr::FaceOutOfBounds` when the arrays disagree.
    pub fn from_parts(
        variant: BodyVariant,
        template: Array2<f32>,
        shapedirs: Array3<f32>,
        faces: Vec<[u32; 3]>,
    ) -> Result<Self> {
        let (n, axes) = template.dim();
        if axes != 3 || n == 0 {
            return Err(ModelErr::ShapeMismatch {
                tensor: TEMPLATE,
                got: template.shape().to_vec(),
                expected: "(N > 0, 3)".into(),
            });
        }

        let (sn, saxes, k) = shapedirs.dim();
        if sn != n || saxes != 3 || k < NUM_BETAS {
            return Err(ModelErr::ShapeMismatch {
                tensor: SHAPEDIRS,
                got: shapedirs.shape().to_vec(),
                expected: format!("({n}, 3, >= {NUM_BETAS})"),
            });
        }

        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= n) {
                return Err(ModelErr::FaceOutOfBounds {
                    face,
                    index: index.into(),
                    vertices: n,
                });
            }
        }

        let shapedirs = shapedirs
            .slice(s![.., .., ..NUM_BETAS])
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((n * 3, NUM_BETAS))
            .map_err(|_| ModelErr::ShapeMismatch {
                tensor: SHAPEDIRS,
                got: vec![n, 3, NUM_BETAS],
                expected: format!("({}, {NUM_BETAS})", n * 3),
            })?;

        Ok(Self {
            variant,
            template,
            shapedirs,
            faces,
        })
    }

    /// Loads a model from a safetensors file holding `v_template`, `shapedirs` and `f`.
    ///
    /// # Errors
    /// `ModelErr::NotFound` when the file does not exist, any other variant when it can't
    /// be read or its tensors are inconsistent.
    pub fn load<P: AsRef<Path>>(path: P, variant: BodyVariant) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelErr::NotFound {
                variant,
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path)?;
        let tensors = SafeTensors::deserialize(&bytes)?;

        let (shape, values) = read_floats(&tensors, TEMPLATE)?;
        let &[n, 3] = shape.as_slice() else {
            return Err(ModelErr::ShapeMismatch {
                tensor: TEMPLATE,
                got: shape,
                expected: "(N, 3)".into(),
            });
        };
        let template = Array2::from_shape_vec((n, 3), values).map_err(|_| {
            ModelErr::ShapeMismatch {
                tensor: TEMPLATE,
                got: vec![n, 3],
                expected: "a contiguous array".into(),
            }
        })?;

        let (shape, values) = read_floats(&tensors, SHAPEDIRS)?;
        let &[sn, saxes, k] = shape.as_slice() else {
            return Err(ModelErr::ShapeMismatch {
                tensor: SHAPEDIRS,
                got: shape,
                expected: "(N, 3, K)".into(),
            });
        };
        let shapedirs = Array3::from_shape_vec((sn, saxes, k), values).map_err(|_| {
            ModelErr::ShapeMismatch {
                tensor: SHAPEDIRS,
                got: vec![sn, saxes, k],
                expected: "a contiguous array".into(),
            }
        })?;

        let faces = read_faces(&tensors)?;
        let model = Self::from_parts(variant, template, shapedirs, faces)?;

        info!(
            variant = variant.as_str(),
            vertices = model.vertex_count(),
            faces = model.faces.len();
            "loaded body model"
        );

        Ok(model)
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Writes the model in the format `load` reads: `F32` template and blend shapes
    /// and `U32` faces. Parent directories are created.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let n = self.vertex_count();
        let template = self.template.as_standard_layout();
        let shapedirs = self.shapedirs.as_standard_layout();
        let template_bytes = as_bytes(template.as_slice());
        let shapedirs_bytes = as_bytes(shapedirs.as_slice());

        let views = [
            (TEMPLATE, TensorView::new(Dtype::F32, vec![n, 3], template_bytes)?),
            (
                SHAPEDIRS,
                TensorView::new(Dtype::F32, vec![n, 3, NUM_BETAS], shapedirs_bytes)?,
            ),
            (
                FACES,
                TensorView::new(
                    Dtype::U32,
                    vec![self.faces.len(), 3],
                    bytemuck::cast_slice(self.faces.as_slice()),
                )?,
            ),
        ];

        let tensors = views.iter().map(|(name, view)| (*name, view));
        let bytes = safetensors::serialize(tensors, &None::<HashMap<String, String>>)?;
        fs::write(path, bytes)?;

        info!(variant = self.variant.as_str(), vertices = n; "saved body model");
        Ok(())
    }
}

impl BodyModel for SmplModel {
    fn variant(&self) -> BodyVariant {
        self.variant
    }

    fn vertex_count(&self) -> usize {
        self.template.nrows()
    }

    fn evaluate(&self, betas: &Betas) -> Result<BodyMesh> {
        let betas = ArrayView1::from(betas.as_slice());
        let offsets: Array1<f32> = self.shapedirs.dot(&betas);
        let offsets = offsets.to_vec();

        let vertices = self
            .template
            .outer_iter()
            .zip(offsets.chunks_exact(3))
            .map(|(rest, delta)| {
                [
                    rest[0] + delta[0],
                    rest[1] + delta[1],
                    rest[2] + delta[2],
                ]
            })
            .collect();

        Ok(BodyMesh::new(vertices, self.faces.clone()))
    }
}

fn read_floats(tensors: &SafeTensors<'_>, name: &'static str) -> Result<(Vec<usize>, Vec<f32>)> {
    let view = tensors.tensor(name)?;
    let data = view.data();

    let values: Vec<f32> = match view.dtype() {
        Dtype::F32 => bytemuck::pod_collect_to_vec(data),
        Dtype::F64 => bytemuck::pod_collect_to_vec::<u8, f64>(data)
            .into_iter()
            .map(|v| v as f32)
            .collect(),
        dtype => {
            return Err(ModelErr::UnsupportedDtype {
                tensor: name,
                dtype: format!("{dtype:?}"),
            });
        }
    };

    Ok((view.shape().to_vec(), values))
}

fn read_faces(tensors: &SafeTensors<'_>) -> Result<Vec<[u32; 3]>> {
    let view = tensors.tensor(FACES)?;
    let shape = view.shape().to_vec();
    if shape.len() != 2 || shape[1] != 3 {
        return Err(ModelErr::ShapeMismatch {
            tensor: FACES,
            got: shape,
            expected: "(F, 3)".into(),
        });
    }

    let data = view.data();
    let indices: Vec<i64> = match view.dtype() {
        Dtype::I32 => widen(bytemuck::pod_collect_to_vec::<u8, i32>(data)),
        Dtype::U32 => widen(bytemuck::pod_collect_to_vec::<u8, u32>(data)),
        Dtype::I64 => bytemuck::pod_collect_to_vec(data),
        dtype => {
            return Err(ModelErr::UnsupportedDtype {
                tensor: FACES,
                dtype: format!("{dtype:?}"),
            });
        }
    };

    indices
        .chunks_exact(3)
        .enumerate()
        .map(|(face, tri)| {
            let mut out = [0; 3];
            for (slot, &index) in out.iter_mut().zip(tri) {
                *slot = u32::try_from(index)
                    .map_err(|_| ModelErr::InvalidFaceIndex { face, index })?;
            }
            Ok(out)
        })
        .collect()
}

fn as_bytes(values: Option<&[f32]>) -> &[u8] {
    values.map(bytemuck::cast_slice::<f32, u8>).unwrap_or_default()
}

fn widen<T: Into<i64>>(values: Vec<T>) -> Vec<i64> {
    values.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> SmplModel {
        let template = Array2::from_shape_vec(
            (4, 3),
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0, //
            ],
        )
        .unwrap();

        // beta 0 moves every vertex up by 1, beta 1 moves x by 2, the rest do nothing.
        let mut shapedirs = Array3::zeros((4, 3, 12));
        for v in 0..4 {
            shapedirs[[v, 1, 0]] = 1.0;
            shapedirs[[v, 0, 1]] = 2.0;
        }

        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        SmplModel::from_parts(BodyVariant::Neutral, template, shapedirs, faces).unwrap()
    }

    #[test]
    fn zero_betas_return_the_template() {
        let model = tetrahedron();
        let mesh = model.evaluate(&Betas::zeros()).unwrap();

        assert_eq!(mesh.vertices[1], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[3], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.faces.len(), 4);
    }

    #[test]
    fn betas_displace_along_blend_shapes() {
        let model = tetrahedron();
        let mut betas = [0.0; NUM_BETAS];
        betas[0] = 0.5;
        betas[1] = -1.0;

        let mesh = model.evaluate(&Betas::new(betas)).unwrap();
        assert_eq!(mesh.vertices[0], [-2.0, 0.5, 0.0]);
        assert_eq!(mesh.vertices[2], [-2.0, 1.5, 0.0]);
    }

    #[test]
    fn rejects_too_few_shape_components() {
        let template = Array2::zeros((3, 3));
        let shapedirs = Array3::zeros((3, 3, NUM_BETAS - 1));
        let err = SmplModel::from_parts(BodyVariant::Male, template, shapedirs, vec![[0, 1, 2]]);
        assert!(matches!(err, Err(ModelErr::ShapeMismatch { tensor: SHAPEDIRS, .. })));
    }

    #[test]
    fn rejects_faces_out_of_bounds() {
        let template = Array2::zeros((3, 3));
        let shapedirs = Array3::zeros((3, 3, NUM_BETAS));
        let err = SmplModel::from_parts(BodyVariant::Male, template, shapedirs, vec![[0, 1, 3]]);
        assert!(matches!(
            err,
            Err(ModelErr::FaceOutOfBounds { face: 0, index: 3, vertices: 3 })
        ));
    }

    #[test]
    fn loads_f64_arrays_and_i64_faces() {
        let template: Vec<f64> = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        let mut shapedirs = vec![0.0f64; 3 * 3 * NUM_BETAS];
        // vertex 2, axis y, beta 0
        shapedirs[(2 * 3 + 1) * NUM_BETAS] = 1.0;
        let faces: Vec<i64> = vec![0, 1, 2];

        let template_bytes: Vec<u8> = template.iter().flat_map(|v| v.to_le_bytes()).collect();
        let shapedirs_bytes: Vec<u8> = shapedirs.iter().flat_map(|v| v.to_le_bytes()).collect();
        let faces_bytes: Vec<u8> = faces.iter().flat_map(|v| v.to_le_bytes()).collect();

        let views = [
            (
                TEMPLATE,
                TensorView::new(Dtype::F64, vec![3, 3], &template_bytes).unwrap(),
            ),
            (
                SHAPEDIRS,
                TensorView::new(Dtype::F64, vec![3, 3, NUM_BETAS], &shapedirs_bytes).unwrap(),
            ),
            (FACES, TensorView::new(Dtype::I64, vec![1, 3], &faces_bytes).unwrap()),
        ];
        let tensors = views.iter().map(|(name, view)| (*name, view));
        let bytes = safetensors::serialize(tensors, &None::<HashMap<String, String>>).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SMPL_FEMALE.safetensors");
        fs::write(&path, bytes).unwrap();

        let model = SmplModel::load(&path, BodyVariant::Female).unwrap();
        assert_eq!(model.variant(), BodyVariant::Female);
        assert_eq!(model.vertex_count(), 3);

        let mut betas = [0.0; NUM_BETAS];
        betas[0] = 0.25;
        let mesh = model.evaluate(&Betas::new(betas)).unwrap();
        assert_eq!(mesh.vertices[2], [0.0, 2.25, 0.0]);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SmplModel::load(dir.path().join("nope.safetensors"), BodyVariant::Male);
        assert!(matches!(err, Err(ModelErr::NotFound { variant: BodyVariant::Male, .. })));
    }

    #[test]
    fn saved_models_load_back() {
        let model = tetrahedron();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smpl").join("SMPL_NEUTRAL.safetensors");
        model.save(&path).unwrap();

        let loaded = SmplModel::load(&path, BodyVariant::Neutral).unwrap();
        assert_eq!(loaded.faces(), model.faces());

        let mut betas = [0.0; NUM_BETAS];
        betas[0] = 0.5;
        betas[1] = -1.0;
        let betas = Betas::new(betas);
        assert_eq!(
            loaded.evaluate(&betas).unwrap(),
            model.evaluate(&betas).unwrap()
        );
    }

    #[test]
    fn negative_face_index_is_reported_as_such() {
        let template = vec![0.0f32; 9];
        let shapedirs = vec![0.0f32; 3 * 3 * NUM_BETAS];
        let faces: Vec<i32> = vec![0, -1, 2];

        let views = [
            (
                TEMPLATE,
                TensorView::new(Dtype::F32, vec![3, 3], bytemuck::cast_slice(template.as_slice()))
                    .unwrap(),
            ),
            (
                SHAPEDIRS,
                TensorView::new(
                    Dtype::F32,
                    vec![3, 3, NUM_BETAS],
                    bytemuck::cast_slice(shapedirs.as_slice()),
                )
                .unwrap(),
            ),
            (
                FACES,
                TensorView::new(Dtype::I32, vec![1, 3], bytemuck::cast_slice(faces.as_slice()))
                    .unwrap(),
            ),
        ];
        let tensors = views.iter().map(|(name, view)| (*name, view));
        let bytes = safetensors::serialize(tensors, &None::<HashMap<String, String>>).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SMPL_MALE.safetensors");
        fs::write(&path, bytes).unwrap();

        let err = SmplModel::load(&path, BodyVariant::Male).err().unwrap();
        assert!(matches!(err, ModelErr::InvalidFaceIndex { face: 0, index: -1 }));
        assert!(!err.to_string().contains("0 vertices"));
    }
}
