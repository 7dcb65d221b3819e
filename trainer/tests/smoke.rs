use std::{net::SocketAddr, sync::Arc, thread};

use axum::Router;
use body_model::{BodyModel, ModelRegistry, fixtures};
use machine_learning::Predictor;
use mesh_export::GlbExporter;
use node::{AppState, router};
use orchestrator::{DiskCache, GenerationPipeline};
use tempfile::TempDir;
use trainer::smoke;

fn app(registry: ModelRegistry, dir: &TempDir) -> Router {
    let cache = DiskCache::open(dir.path().join("cache")).unwrap();
    let pipeline =
        GenerationPipeline::new(registry, Predictor::unloaded(), cache, GlbExporter::new());
    router(AppState::new(pipeline))
}

fn serve(app: Router) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    addr
}

#[test]
fn every_check_passes_against_a_healthy_service() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::with_loader(|variant| {
        let model: Arc<dyn BodyModel> = Arc::new(fixtures::ring_body(variant));
        Ok(model)
    });
    let addr = serve(app(registry, &dir));
    let out = dir.path().join("test_avatar.glb");

    smoke::run(&format!("http://{addr}/"), &out).unwrap();

    let glb = std::fs::read(&out).unwrap();
    assert_eq!(&glb[..4], b"glTF");
}

#[test]
fn missing_models_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::from_dir(dir.path().join("models"));
    let addr = serve(app(registry, &dir));
    let out = dir.path().join("test_avatar.glb");

    let checks = smoke::checks(&format!("http://{addr}"), &out).unwrap();
    let failed: Vec<_> = checks
        .iter()
        .filter(|check| check.result.is_err())
        .map(|check| check.name)
        .collect();
    assert_eq!(failed, ["health", "generate"]);
    assert!(!out.exists());

    assert!(smoke::run(&format!("http://{addr}"), &out).is_err());
}
