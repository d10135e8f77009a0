//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::RunKind;

/// Deterministic run id from the scenario content, the run kind, and the
/// solver version. Re-running an unchanged scenario lands on the same run
/// directory instead of accumulating duplicates.
pub fn compute_run_id<T: Serialize>(scenario: &T, kind: &RunKind, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());

    let kind_json = serde_json::to_string(kind).unwrap_or_default();
    hasher.update(kind_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct FakeScenario {
        name: String,
        segments: usize,
        impulse_n: f64,
    }

    fn scenario(name: &str, impulse_n: f64) -> FakeScenario {
        FakeScenario {
            name: name.to_string(),
            segments: 6,
            impulse_n,
        }
    }

    fn kind() -> RunKind {
        RunKind::Response {
            t_final_s: 0.5,
            dt_report_s: 0.01,
        }
    }

    #[test]
    fn hash_stability() {
        let hash1 = compute_run_id(&scenario("pluck", 0.1), &kind(), "v1");
        let hash2 = compute_run_id(&scenario("pluck", 0.1), &kind(), "v1");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = compute_run_id(&scenario("pluck", 0.1), &kind(), "v1");
        assert_ne!(base, compute_run_id(&scenario("pluck", 0.2), &kind(), "v1"));
        assert_ne!(base, compute_run_id(&scenario("tap", 0.1), &kind(), "v1"));
        assert_ne!(base, compute_run_id(&scenario("pluck", 0.1), &kind(), "v2"));
        let other_kind = RunKind::Response {
            t_final_s: 1.0,
            dt_report_s: 0.01,
        };
        assert_ne!(
            base,
            compute_run_id(&scenario("pluck", 0.1), &other_kind, "v1")
        );
    }
}
