//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub kind: RunKind,
    /// Report samples written to the frame file.
    pub samples: usize,
    /// Integrator steps attempted to produce them.
    pub steps: usize,
    /// Node x positions, root first [m]; constant across the run.
    pub x_m: Vec<f64>,
}

/// Inputs that define what was simulated (hashed into the run id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunKind {
    Response { t_final_s: f64, dt_report_s: f64 },
}

/// One reconstructed beam shape per report time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShapeFrameRecord {
    pub time_s: f64,
    /// Node deflections, clamped root included [m].
    pub y_m: Vec<f64>,
    pub tip_y_m: f64,
}

/// Flat export document consumed by plotting tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseDocument {
    pub times: Vec<f64>,
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<Vec<f64>>,
    pub tip_displacement: Vec<f64>,
}

impl ResponseDocument {
    /// Flatten stored frames against the run geometry.
    pub fn from_frames(x_m: &[f64], frames: &[ShapeFrameRecord]) -> Self {
        Self {
            times: frames.iter().map(|f| f.time_s).collect(),
            x_coords: x_m.to_vec(),
            y_coords: frames.iter().map(|f| f.y_m.clone()).collect(),
            tip_displacement: frames.iter().map(|f| f.tip_y_m).collect(),
        }
    }
}
