//! Collection of the per-run JSON-LD documents the astroquery hook leaves in
//! the metadata directory.

use std::path::Path;

use serde::Serialize;

use crate::error::{AnnotationError, AnnotationResult};

/// Source tag attached to every collected annotation.
pub const ANNOTATION_SOURCE: &str = "AQS plugin";

/// One run annotation, ready to be attached to the run's activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAnnotation {
    pub id: String,
    pub source: String,
    pub body: serde_json::Value,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AnnotationError + '_ {
    move |source| AnnotationError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Read and consume the annotation documents of run `run_id`.
///
/// `*.jsonld` files become [`RunAnnotation`]s with id
/// `<run_id>/annotations/aqs/<@id>` and are deleted afterwards. `*.json`
/// files are only logged. A missing directory yields no annotations.
pub fn collect_run_annotations(metadata_dir: &Path, run_id: &str) -> AnnotationResult<Vec<RunAnnotation>> {
    if !metadata_dir.exists() {
        tracing::info!(dir = %metadata_dir.display(), "annotations: nothing to process");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(metadata_dir).map_err(io_error(metadata_dir))? {
        let entry = entry.map_err(io_error(metadata_dir))?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut annotations = Vec::new();
    for path in paths {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                tracing::info!(path = %path.display(), "annotations: found json annotation");
            }
            Some("jsonld") => {
                let content = std::fs::read_to_string(&path).map_err(io_error(&path))?;
                let body: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| AnnotationError::Json {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                let model_id = body
                    .get("@id")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| AnnotationError::MissingId {
                        path: path.display().to_string(),
                    })?
                    .to_string();
                std::fs::remove_file(&path).map_err(io_error(&path))?;
                tracing::info!(path = %path.display(), id = %model_id, "annotations: collected jsonld annotation");
                annotations.push(RunAnnotation {
                    id: format!("{run_id}/annotations/aqs/{model_id}"),
                    source: ANNOTATION_SOURCE.to_string(),
                    body,
                });
            }
            _ => {}
        }
    }
    Ok(annotations)
}
