//! Verifier output shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Unsure,
}

impl Verdict {
    /// Mirrors the source aggregation rule: a verdict "counts" toward a
    /// passing arithmetic gate when its text representation contains "pass"
    /// or "yes" -- `Pass` is the only variant that qualifies today, but the
    /// check is phrased this way because the structured schema is the
    /// canonical path and free-text fallbacks are matched loosely.
    pub fn is_passing(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Tri-state result of the optional symbolic sanity check: `Some(true)` the
/// extracted expression evaluated successfully, `Some(false)` it evaluated
/// but was invalid/NaN/infinite, `None` no candidate expression was found.
pub type ArithResult = Option<bool>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arith: Option<ArithResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationRecord {
    /// The unparseable-output sentinel: no best-effort guessing, ever.
    pub fn unparseable() -> Self {
        Self {
            verdict: Some(Verdict::Fail),
            error: Some("verification_output_unparseable".to_string()),
            ..Default::default()
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.verdict, Some(Verdict::Pass))
    }

    /// Applies the parallel-check aggregation rule: good iff the verdict
    /// passes AND the arithmetic check did not come back `false`.
    pub fn passes_with_arith_gate(&self) -> bool {
        let verdict_ok = self.is_pass();
        let arith_ok = match self.arith {
            Some(Some(false)) => false,
            _ => true,
        };
        verdict_ok && arith_ok
    }
}
