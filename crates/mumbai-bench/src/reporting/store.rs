use crate::errors::BenchResult;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SINGLE_RESULTS_FILE: &str = "results.json";
pub const FINAL_REPORT_FILE: &str = "final_report.json";

/// Writes pretty-printed JSON documents under an output directory.
///
/// Every write replaces the whole file; nothing is appended.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Serialize `data` with two-space indentation and overwrite `file_name`
    pub fn write<T: Serialize + ?Sized>(&self, file_name: &str, data: &T) -> BenchResult<PathBuf> {
        let path = self.path_for(file_name);
        write_json(&path, data)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output = serde_json::to_string_pretty(data)?;
    fs::write(path, output)?;
    Ok(())
}

/// File name stem for a model, safe on every platform (`llama3:8b` → `llama3_8b`)
pub fn model_file_stem(model: &str) -> String {
    model
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

pub fn model_results_file(model: &str) -> String {
    format!("{}_results.json", model_file_stem(model))
}
