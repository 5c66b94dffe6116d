use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_B: f64 = 0.75;
pub const DEFAULT_K: f64 = 1.75;

/// BM25 hyperparameters.
///
/// `b` controls document length normalization and must lie in `[0, 1]`.
/// `k` controls term frequency saturation; it must be non-negative and may be
/// `f64::INFINITY`, in which case a posting scores `tf * log2(N / df)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_k")]
    pub k: f64,
}

fn default_b() -> f64 { DEFAULT_B }
fn default_k() -> f64 { DEFAULT_K }

impl Default for Bm25Params {
    fn default() -> Self {
        Self { b: DEFAULT_B, k: DEFAULT_K }
    }
}

impl Bm25Params {
    pub fn new(b: f64, k: f64) -> Result<Self> {
        let params = Self { b, k };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidParams(format!("b must be in [0, 1], got {}", self.b)));
        }
        if self.k.is_nan() || self.k < 0.0 {
            return Err(Error::InvalidParams(format!("k must be >= 0, got {}", self.k)));
        }
        Ok(())
    }

    /// Saturated and length-normalized term frequency, the part of BM25 that
    /// multiplies the inverse document frequency.
    pub fn tf_component(&self, tf: u32, doc_len: u32, avdl: f64) -> f64 {
        let tf = tf as f64;
        if self.k.is_infinite() {
            return tf;
        }
        let norm = 1.0 - self.b + self.b * doc_len as f64 / avdl;
        if self.k > 1.0 {
            // Divided through by k so that huge k cannot overflow to inf / inf.
            tf * (1.0 + 1.0 / self.k) / (norm + tf / self.k)
        } else {
            tf * (self.k + 1.0) / (self.k * norm + tf)
        }
    }
}
