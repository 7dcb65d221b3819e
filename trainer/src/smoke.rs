//! End to end checks against a running service.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail, ensure};
use log::info;
use reqwest::blocking::Client;
use serde_json::{Value, json};

const TIMEOUT: Duration = Duration::from_secs(120);

/// The outcome of one check.
#[derive(Debug)]
pub struct Check {
    pub name: &'static str,
    pub result: Result<String>,
}

fn health(client: &Client, base: &str) -> Result<String> {
    let response = client.get(format!("{base}/health")).send()?;
    let status = response.status();
    let body: Value = response.json()?;
    ensure!(status.is_success(), "status {status}: {body}");

    Ok(format!(
        "regression_model_loaded = {}",
        body["regression_model_loaded"]
    ))
}

fn ranges(client: &Client, base: &str) -> Result<String> {
    let response = client.get(format!("{base}/measurement-ranges")).send()?;
    let status = response.status();
    let body: Value = response.json()?;
    ensure!(status.is_success(), "status {status}: {body}");

    let fields = body.as_object().map_or(0, |ranges| ranges.len());
    Ok(format!("{fields} ranges"))
}

fn generate(client: &Client, base: &str, out: &Path) -> Result<String> {
    let sample = json!({
        "height": 175,
        "chest": 95,
        "waist": 80,
        "hips": 98,
        "shoulderWidth": 45,
        "armLength": 60,
        "inseam": 78,
        "neckCircumference": 38,
        "gender": "neutral",
    });

    let response = client
        .post(format!("{base}/generate"))
        .json(&sample)
        .send()?;
    let status = response.status();
    if !status.is_success() {
        bail!("status {status}: {}", response.text()?);
    }

    let bytes = response.bytes()?;
    ensure!(bytes.starts_with(b"glTF"), "response is not a GLB file");
    fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;

    Ok(format!("{} bytes saved to {}", bytes.len(), out.display()))
}

fn invalid(client: &Client, base: &str) -> Result<String> {
    let sample = json!({
        "height": 300,
        "chest": 50,
        "waist": 80,
        "hips": 98,
        "shoulderWidth": 45,
        "gender": "neutral",
    });

    let response = client
        .post(format!("{base}/generate"))
        .json(&sample)
        .send()?;
    let status = response.status();
    ensure!(
        status.is_client_error(),
        "expected a rejection, got status {status}"
    );

    Ok(format!("rejected with {status}"))
}

/// Runs every check against the service at `url`.
///
/// # Arguments
/// * `url` - The service root, e.g. `http://localhost:8000`.
/// * `out` - Where the generated mesh is written.
pub fn checks(url: &str, out: &Path) -> Result<Vec<Check>> {
    let client = Client::builder().timeout(TIMEOUT).build()?;
    let base = url.trim_end_matches('/');
    info!("checking service at {base}");

    Ok(vec![
        Check {
            name: "health",
            result: health(&client, base),
        },
        Check {
            name: "measurement ranges",
            result: ranges(&client, base),
        },
        Check {
            name: "generate",
            result: generate(&client, base, out),
        },
        Check {
            name: "invalid measurements",
            result: invalid(&client, base),
        },
    ])
}

/// Runs the checks and prints a summary.
///
/// # Errors
/// If any check failed.
pub fn run(url: &str, out: &Path) -> Result<()> {
    let checks = checks(url, out)?;

    for check in &checks {
        match &check.result {
            Ok(detail) => println!("PASS  {:<22} {detail}", check.name),
            Err(e) => println!("FAIL  {:<22} {e:#}", check.name),
        }
    }

    let failed = checks.iter().filter(|check| check.result.is_err()).count();
    println!("{}/{} checks passed", checks.len() - failed, checks.len());

    if failed > 0 {
        bail!("{failed} smoke checks failed");
    }
    Ok(())
}
