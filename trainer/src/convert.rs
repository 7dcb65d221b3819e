//! Conversion of SMPL `.npz` releases into the model files the service loads.

use std::{fs::File, path::Path};

use anyhow::{Context, Result, ensure};
use body_model::{BodyModel, SmplModel};
use log::info;
use ndarray::{Array, Array2, Dimension};
use ndarray_npy::{NpzReader, ReadNpzError};
use specs::BodyVariant;

type Archive = NpzReader<File>;

const TEMPLATE: &str = "v_template";
const SHAPEDIRS: &str = "shapedirs";
const FACES: &str = "f";

fn read_floats<D: Dimension>(npz: &mut Archive, name: &str) -> Result<Array<f32, D>> {
    let wide: std::result::Result<Array<f64, D>, ReadNpzError> = npz.by_name(name);
    if let Ok(values) = wide {
        return Ok(values.mapv(|v| v as f32));
    }

    npz.by_name(name)
        .with_context(|| format!("reading {name} as f64 or f32"))
}

fn read_faces(npz: &mut Archive) -> Result<Array2<i64>> {
    let unsigned: std::result::Result<Array2<u32>, ReadNpzError> = npz.by_name(FACES);
    if let Ok(faces) = unsigned {
        return Ok(faces.mapv(i64::from));
    }

    let narrow: std::result::Result<Array2<i32>, ReadNpzError> = npz.by_name(FACES);
    if let Ok(faces) = narrow {
        return Ok(faces.mapv(i64::from));
    }

    npz.by_name(FACES)
        .with_context(|| format!("reading {FACES} as an integer matrix"))
}

/// Reads `v_template`, `shapedirs` and `f` from an SMPL `.npz` archive.
///
/// Only the first ten shape components are kept. Every other array in the archive
/// (pose blend shapes, joint regressor, skinning weights) is ignored.
pub fn read_npz(path: &Path, variant: BodyVariant) -> Result<SmplModel> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut npz = NpzReader::new(file)
        .with_context(|| format!("reading archive {}", path.display()))?;

    let template = read_floats(&mut npz, TEMPLATE)?;
    let shapedirs = read_floats(&mut npz, SHAPEDIRS)?;

    let indices = read_faces(&mut npz)?;
    ensure!(
        indices.ncols() == 3,
        "{FACES} has shape {:?}, expected (F, 3)",
        indices.shape()
    );
    let faces = indices
        .outer_iter()
        .enumerate()
        .map(|(face, tri)| {
            let mut out = [0; 3];
            for (slot, &index) in out.iter_mut().zip(tri.iter()) {
                *slot = u32::try_from(index)
                    .with_context(|| format!("face {face} has index {index}"))?;
            }
            Ok(out)
        })
        .collect::<Result<Vec<[u32; 3]>>>()?;

    Ok(SmplModel::from_parts(variant, template, shapedirs, faces)?)
}

/// Converts the archive at `input` and writes the model to `output`.
pub fn convert(input: &Path, variant: BodyVariant, output: &Path) -> Result<()> {
    let model = read_npz(input, variant)?;
    model
        .save(output)
        .with_context(|| format!("saving body model {}", output.display()))?;

    info!(
        variant = variant.as_str(),
        vertices = model.vertex_count(),
        faces = model.faces().len();
        "converted body model"
    );
    println!(
        "{variant} model with {} vertices and {} faces saved to {}",
        model.vertex_count(),
        model.faces().len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use body_model::{Betas, NUM_BETAS, model_path};
    use ndarray::{Array3, array};
    use ndarray_npy::NpzWriter;

    use super::*;

    // A single triangle with 12 shape components, the first moving vertex 2 up.
    fn write_triangle(path: &Path, faces: Array2<i64>) {
        let mut shapedirs = Array3::<f64>::zeros((3, 3, 12));
        shapedirs[[2, 1, 0]] = 1.0;

        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array(
            TEMPLATE,
            &array![[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        npz.add_array(SHAPEDIRS, &shapedirs).unwrap();
        npz.add_array(FACES, &faces).unwrap();
        npz.add_array("weights", &Array2::<f64>::ones((3, 1))).unwrap();
        npz.finish().unwrap();
    }

    #[test]
    fn converted_model_loads_and_evaluates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("SMPL_NEUTRAL.npz");
        write_triangle(&input, array![[0, 1, 2]]);

        let output = model_path(&dir.path().join("models"), BodyVariant::Neutral);
        convert(&input, BodyVariant::Neutral, &output).unwrap();

        let model = SmplModel::load(&output, BodyVariant::Neutral).unwrap();
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.faces().to_vec(), vec![[0u32, 1, 2]]);

        let mut betas = [0.0; NUM_BETAS];
        betas[0] = 0.5;
        let mesh = model.evaluate(&Betas::new(betas)).unwrap();
        assert_eq!(mesh.vertices[2], [0.0, 1.5, 0.0]);
    }

    #[test]
    fn rejects_negative_faces_and_missing_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.npz");
        write_triangle(&input, array![[0, -1, 2]]);

        let err = read_npz(&input, BodyVariant::Male).err().unwrap();
        assert!(format!("{err:#}").contains("face 0 has index -1"));

        let empty = dir.path().join("empty.npz");
        NpzWriter::new(File::create(&empty).unwrap())
            .finish()
            .unwrap();
        let err = read_npz(&empty, BodyVariant::Male).err().unwrap();
        assert!(format!("{err:#}").contains(TEMPLATE));
    }
}
