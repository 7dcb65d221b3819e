use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use body_model::NUM_BETAS;
use ndarray::{Array2, ArrayView2, Axis};
use safetensors::{Dtype, SafeTensors, tensor::TensorView};
use specs::{BodyVariant, FeatureSchema, MeasurementSet};

use crate::{MlErr, Result};

const MEASUREMENTS: &str = "measurements";
const BETAS: &str = "betas";
const SCHEMA_KEY: &str = "feature_schema";

/// The path a variant's corpus is stored at under `data_dir`.
pub fn corpus_path(data_dir: &Path, variant: BodyVariant) -> PathBuf {
    data_dir
        .join("training_data")
        .join(format!("synthetic_data_{variant}.safetensors"))
}

/// Synthetic training samples: one row of measurements and one row of betas per body.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    schema: FeatureSchema,
    // (n, schema.len())
    measurements: Array2<f64>,
    // (n, NUM_BETAS)
    betas: Array2<f64>,
}

impl Corpus {
    /// Creates a new `Corpus`.
    ///
    /// # Arguments
    /// * `schema` - The ordering of the measurement columns.
    /// * `measurements` - One row per sample, one column per schema key.
    /// * `betas` - One row per sample, `NUM_BETAS` columns.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if the arrays disagree with each other or with the schema.
    pub fn new(schema: FeatureSchema, measurements: Array2<f64>, betas: Array2<f64>) -> Result<Self> {
        if measurements.ncols() != schema.len() {
            return Err(MlErr::SizeMismatch {
                a: "measurement columns",
                b: "feature schema",
                got: measurements.ncols(),
                expected: schema.len(),
            });
        }

        if betas.ncols() != NUM_BETAS {
            return Err(MlErr::SizeMismatch {
                a: "beta columns",
                b: "shape components",
                got: betas.ncols(),
                expected: NUM_BETAS,
            });
        }

        if measurements.nrows() != betas.nrows() {
            return Err(MlErr::SizeMismatch {
                a: "measurement rows",
                b: "beta rows",
                got: measurements.nrows(),
                expected: betas.nrows(),
            });
        }

        Ok(Self {
            schema,
            measurements,
            betas,
        })
    }

    /// Builds a canonical schema corpus from labelled samples.
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (&'a MeasurementSet, &'a [f32; NUM_BETAS])>,
    {
        let schema = FeatureSchema::canonical();
        let rows: Vec<(Vec<f64>, [f32; NUM_BETAS])> = samples
            .into_iter()
            .map(|(set, betas)| (schema.features(set), *betas))
            .collect();

        let measurements = Array2::from_shape_fn((rows.len(), schema.len()), |(i, j)| rows[i].0[j]);
        let betas = Array2::from_shape_fn((rows.len(), NUM_BETAS), |(i, j)| f64::from(rows[i].1[j]));

        Self {
            schema,
            measurements,
            betas,
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn measurements(&self) -> ArrayView2<'_, f64> {
        self.measurements.view()
    }

    pub fn betas(&self) -> ArrayView2<'_, f64> {
        self.betas.view()
    }

    /// The rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Array2<f64>) {
        (
            self.measurements.select(Axis(0), indices),
            self.betas.select(Axis(0), indices),
        )
    }

    /// Writes the corpus as a safetensors file, creating parent directories.
    ///
    /// Both arrays are stored as little endian `F64` and the schema goes into the
    /// file's metadata.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let measurements = self.measurements.as_standard_layout();
        let betas = self.betas.as_standard_layout();
        let measurement_bytes = as_bytes(measurements.as_slice());
        let beta_bytes = as_bytes(betas.as_slice());

        let views = [
            (
                MEASUREMENTS,
                TensorView::new(
                    Dtype::F64,
                    vec![self.len(), self.schema.len()],
                    measurement_bytes,
                )?,
            ),
            (
                BETAS,
                TensorView::new(Dtype::F64, vec![self.len(), NUM_BETAS], beta_bytes)?,
            ),
        ];

        let metadata = HashMap::from([(SCHEMA_KEY.to_string(), serde_json::to_string(&self.schema)?)]);
        let tensors = views.iter().map(|(name, view)| (*name, view));
        let bytes = safetensors::serialize(tensors, &Some(metadata))?;
        fs::write(path, bytes)?;

        Ok(())
    }

    /// Reads a corpus written by `save`.
    ///
    /// A file without a recorded schema is read with the canonical one.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let (_, header) = SafeTensors::read_metadata(&bytes)?;
        let schema = match header.metadata().as_ref().and_then(|m| m.get(SCHEMA_KEY)) {
            Some(json) => serde_json::from_str(json)?,
            None => FeatureSchema::canonical(),
        };

        let tensors = SafeTensors::deserialize(&bytes)?;
        let measurements = read_matrix(&tensors, MEASUREMENTS)?;
        let betas = read_matrix(&tensors, BETAS)?;

        Self::new(schema, measurements, betas)
    }
}

fn as_bytes(values: Option<&[f64]>) -> &[u8] {
    values.map(bytemuck::cast_slice::<f64, u8>).unwrap_or_default()
}

fn read_matrix(tensors: &SafeTensors<'_>, name: &'static str) -> Result<Array2<f64>> {
    let view = tensors
        .tensor(name)
        .map_err(|_| MlErr::MissingTensor(name))?;

    let &[rows, cols] = view.shape() else {
        return Err(MlErr::SizeMismatch {
            a: name,
            b: "a matrix",
            got: view.shape().len(),
            expected: 2,
        });
    };

    let data = view.data();
    let values: Vec<f64> = match view.dtype() {
        Dtype::F64 => bytemuck::pod_collect_to_vec::<u8, f64>(data),
        Dtype::F32 => bytemuck::pod_collect_to_vec::<u8, f32>(data)
            .into_iter()
            .map(f64::from)
            .collect(),
        dtype => {
            return Err(MlErr::UnsupportedDtype {
                tensor: name,
                dtype: format!("{dtype:?}"),
            });
        }
    };

    let len = values.len();
    Array2::from_shape_vec((rows, cols), values).map_err(|_| MlErr::SizeMismatch {
        a: name,
        b: "its shape",
        got: len,
        expected: rows * cols,
    })
}
