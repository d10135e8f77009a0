//! Scenario file schema and loading.
//!
//! A scenario is the YAML description of one transient study: the segment
//! table (inline, or in a CSV file next to the scenario), optional damping,
//! the impulse, and the simulation window. [`load_scenario`] resolves a CSV
//! reference into the inline form before anything else sees the scenario,
//! so the definition that gets hashed into a run id always carries the
//! actual segment values rather than a file name.

use std::path::{Path, PathBuf};

use fb_model::{Damping, SegmentParams, SegmentTable};
use fb_sim::{ImpulseForce, SimOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Latest scenario schema version this binary understands.
pub const SCENARIO_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub version: u32,
    pub name: String,
    pub beam: BeamDef,
    #[serde(default)]
    pub damping: Option<DampingDef>,
    pub impulse: ImpulseDef,
    pub sim: SimDef,
}

/// Beam description: segments written inline, or the path of a CSV table
/// resolved relative to the scenario file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BeamDef {
    Inline { segments: Vec<SegmentParams> },
    Csv { segments_csv: PathBuf },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum DampingDef {
    Rayleigh { alpha: f64, beta: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpulseDef {
    /// Force magnitude while the pulse is active [N].
    pub magnitude_n: f64,
    /// Pulse length [s]; the active window is half-open, `t < duration`.
    pub duration_s: f64,
    /// Explicit input slot; defaults to the node next to the tip.
    #[serde(default)]
    pub at_dof: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimDef {
    pub t_final_s: f64,
    pub dt_report_s: f64,
    #[serde(default = "default_rel_tol")]
    pub rel_tol: f64,
    #[serde(default = "default_abs_tol")]
    pub abs_tol: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_rel_tol() -> f64 {
    1.0e-3
}

fn default_abs_tol() -> f64 {
    1.0e-6
}

fn default_max_steps() -> usize {
    100_000
}

impl ScenarioDef {
    /// Scenario-level checks. Numeric validation of the segments and the
    /// pulse happens in the model and simulation layers; this catches what
    /// only the schema knows about.
    pub fn validate(&self) -> CliResult<()> {
        if self.version > SCENARIO_VERSION {
            return Err(CliError::Scenario {
                what: format!(
                    "unsupported scenario version {} (latest is {})",
                    self.version, SCENARIO_VERSION
                ),
            });
        }
        if self.name.trim().is_empty() {
            return Err(CliError::Scenario {
                what: "scenario name is empty".to_string(),
            });
        }
        if let BeamDef::Inline { segments } = &self.beam
            && segments.is_empty()
        {
            return Err(CliError::Scenario {
                what: "beam has no segments".to_string(),
            });
        }
        if !(self.sim.t_final_s > 0.0) || !self.sim.t_final_s.is_finite() {
            return Err(CliError::Scenario {
                what: format!("sim.t_final_s = {} (must be positive)", self.sim.t_final_s),
            });
        }
        if !(self.sim.dt_report_s > 0.0) || !self.sim.dt_report_s.is_finite() {
            return Err(CliError::Scenario {
                what: format!(
                    "sim.dt_report_s = {} (must be positive)",
                    self.sim.dt_report_s
                ),
            });
        }
        if !(self.sim.rel_tol > 0.0) || !(self.sim.abs_tol > 0.0) {
            return Err(CliError::Scenario {
                what: format!(
                    "solver tolerances rel = {}, abs = {} (must be positive)",
                    self.sim.rel_tol, self.sim.abs_tol
                ),
            });
        }
        if self.sim.max_steps == 0 {
            return Err(CliError::Scenario {
                what: "sim.max_steps = 0 (must be positive)".to_string(),
            });
        }
        Ok(())
    }

    /// Build the validated segment table. Call on a loaded scenario; a CSV
    /// path that was not resolved by [`load_scenario`] is read as-is.
    pub fn segment_table(&self) -> CliResult<SegmentTable> {
        match &self.beam {
            BeamDef::Inline { segments } => Ok(SegmentTable::new(segments.clone())?),
            BeamDef::Csv { segments_csv } => Ok(SegmentTable::from_csv_path(segments_csv)?),
        }
    }

    pub fn damping(&self) -> Damping {
        match self.damping {
            Some(DampingDef::Rayleigh { alpha, beta }) => Damping::Rayleigh { alpha, beta },
            None => Damping::None,
        }
    }

    pub fn sim_options(&self) -> SimOptions {
        SimOptions {
            t_final_s: self.sim.t_final_s,
            dt_report_s: self.sim.dt_report_s,
            rel_tol: self.sim.rel_tol,
            abs_tol: self.sim.abs_tol,
            max_steps: self.sim.max_steps,
        }
    }

    /// Build the pulse for a model with `n_states` coordinates.
    pub fn impulse(&self, n_states: usize) -> CliResult<ImpulseForce> {
        if let Some(dof) = self.impulse.at_dof
            && dof >= n_states
        {
            return Err(CliError::Scenario {
                what: format!(
                    "impulse.at_dof = {} out of range for {} model coordinates",
                    dof, n_states
                ),
            });
        }
        let force = match self.impulse.at_dof {
            Some(dof) => ImpulseForce::new(self.impulse.magnitude_n, self.impulse.duration_s, dof)?,
            None => ImpulseForce::tip_adjacent(
                self.impulse.magnitude_n,
                self.impulse.duration_s,
                n_states,
            )?,
        };
        Ok(force)
    }
}

/// Read a scenario file, validate it, and inline any CSV segment table.
pub fn load_scenario(path: &Path) -> CliResult<ScenarioDef> {
    let content = std::fs::read_to_string(path)?;
    let mut scenario: ScenarioDef = serde_yaml::from_str(&content)?;
    scenario.validate()?;

    if let BeamDef::Csv { segments_csv } = &scenario.beam {
        let base = path.parent().unwrap_or(Path::new("."));
        let table = SegmentTable::from_csv_path(&base.join(segments_csv))?;
        scenario.beam = BeamDef::Inline {
            segments: table.segments().to_vec(),
        };
    }

    debug!(path = %path.display(), name = %scenario.name, "scenario loaded");
    Ok(scenario)
}
