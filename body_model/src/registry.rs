use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use log::info;
use parking_lot::Mutex;
use specs::BodyVariant;

use crate::{BodyModel, Result, SmplModel};

type Loader = dyn Fn(BodyVariant) -> Result<Arc<dyn BodyModel>> + Send + Sync;

#[derive(Default)]
struct Slot {
    model: OnceLock<Arc<dyn BodyModel>>,
    // Held while the model is being built.
    loading: Mutex<()>,
}

/// The path of a variant's model file under `models_dir`.
pub fn model_path(models_dir: &Path, variant: BodyVariant) -> PathBuf {
    models_dir.join("smpl").join(variant.model_file_name())
}

/// Memoizes one body model per variant.
///
/// Models are built on first access and never evicted, so the table holds at most one
/// entry per `BodyVariant`. A failed load is returned to the caller and retried on the
/// next access. Each variant has its own lock, so a slow load only blocks callers of
/// that variant.
pub struct ModelRegistry {
    loader: Box<Loader>,
    models: Mutex<HashMap<BodyVariant, Arc<Slot>>>,
}

impl ModelRegistry {
    /// Creates a registry that loads `SmplModel`s from `models_dir/smpl`.
    pub fn from_dir<P: Into<PathBuf>>(models_dir: P) -> Self {
        let models_dir = models_dir.into();
        Self::with_loader(move |variant| {
            let path = model_path(&models_dir, variant);
            info!("loading {variant} body model from {}", path.display());
            let model: Arc<dyn BodyModel> = Arc::new(SmplModel::load(path, variant)?);
            Ok(model)
        })
    }

    /// Creates a registry backed by an arbitrary loader.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(BodyVariant) -> Result<Arc<dyn BodyModel>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the model for `variant`, loading it if this is the first access.
    ///
    /// # Errors
    /// Whatever the loader returns when the model can't be built.
    pub fn get(&self, variant: BodyVariant) -> Result<Arc<dyn BodyModel>> {
        let slot = Arc::clone(self.models.lock().entry(variant).or_default());
        if let Some(model) = slot.model.get() {
            return Ok(Arc::clone(model));
        }

        let _loading = slot.loading.lock();
        if let Some(model) = slot.model.get() {
            return Ok(Arc::clone(model));
        }

        let model = (self.loader)(variant)?;
        let model = slot.model.get_or_init(|| model);
        Ok(Arc::clone(model))
    }

    /// The variants loaded so far.
    pub fn loaded(&self) -> Vec<BodyVariant> {
        let models = self.models.lock();
        BodyVariant::ALL
            .into_iter()
            .filter(|variant| {
                models
                    .get(variant)
                    .is_some_and(|slot| slot.model.get().is_some())
            })
            .collect()
    }
}
