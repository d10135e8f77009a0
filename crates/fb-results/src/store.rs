//! Run storage API.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{RunManifest, ShapeFrameRecord};
use crate::{ResultsError, ResultsResult};

/// Directory-per-run store: `<root>/<run_id>/manifest.json` plus
/// `frames.jsonl` with one shape record per line.
#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store rooted next to a scenario file: `<dir>/.flexbeam/runs`.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let base = scenario_path.parent().unwrap_or_else(|| Path::new("."));
        Self::new(base.join(".flexbeam").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        frames: &[ShapeFrameRecord],
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        let frames_path = run_dir.join("frames.jsonl");
        let mut frames_content = String::new();
        for frame in frames {
            let line = serde_json::to_string(frame)?;
            frames_content.push_str(&line);
            frames_content.push('\n');
        }
        fs::write(frames_path, frames_content)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_frames(&self, run_id: &str) -> ResultsResult<Vec<ShapeFrameRecord>> {
        let frames_path = self.run_dir(run_id).join("frames.jsonl");

        if !frames_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(frames_path)?;
        let mut frames = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let frame: ShapeFrameRecord = serde_json::from_str(line)?;
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    pub fn list_runs(&self, scenario_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.scenario_name == scenario_name
                {
                    runs.push(manifest);
                }
            }
        }

        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
