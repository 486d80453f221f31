//! Linearization Parameters
//!
//!
//!

use std::str::FromStr;

use anyhow::anyhow;

use serde::{Deserialize, Serialize};

/// edge significance threshold. A walk contribution below it is treated as structurally
/// absent, both when building the vocabulary and when linearizing.
pub const EPSIL_DEFAULT : f64 = 1.0E-5;

/// pooling policy applied when several matrix entries fall on the same feature rank.
/// Textual configuration surfaces must validate at their edge, anything else than
/// sum or max is a configuration defect aborting the whole run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolingMode {
    /// a feature accumulates the sum of its contributions.
    Sum,
    /// a feature keeps its largest contribution.
    Max,
} // end of PoolingMode

impl FromStr for PoolingMode {
    type Err = anyhow::Error;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(PoolingMode::Sum),
            "max" => Ok(PoolingMode::Max),
            _     => Err(anyhow!("unsupported pooling mode : {}", s)),
        }
    }
} // end of impl FromStr for PoolingMode

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    /// pooling policy.
    pub mode : PoolingMode,
    /// edge significance threshold.
    pub epsil : f64,
    /// parallel mode
    pub parallel : bool,
} // end of LinearParams


impl LinearParams {

    pub fn new(mode : PoolingMode, epsil : f64, parallel : bool) -> Self {
        LinearParams{mode, epsil, parallel}
    }

    ///
    pub fn get_mode(&self) -> PoolingMode { self.mode }

    ///
    pub fn get_epsil(&self) -> f64 { self.epsil }

    ///
    pub fn get_parallel(&self) -> bool { self.parallel }

} // end of impl LinearParams

impl Default for LinearParams {
    fn default() -> Self {
        LinearParams{mode : PoolingMode::Sum, epsil : EPSIL_DEFAULT, parallel : false}
    }
}

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    #[allow(dead_code)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_mode_from_str() {
        log_init_test();
        //
        assert_eq!(PoolingMode::from_str("sum").unwrap(), PoolingMode::Sum);
        assert_eq!(PoolingMode::from_str("max").unwrap(), PoolingMode::Max);
        assert!(PoolingMode::from_str("mean").is_err());
    } // end of test_mode_from_str

} // end of mod tests
