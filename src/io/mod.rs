//! io : vocabulary persistence and feature file dumps.
//!
//! The in memory shape of a vocabulary (label pair key to rank plus the next rank
//! counter) is what any persistence layer must serialize losslessly, see
//! [vocabbson](vocabbson).

/// Describes dump destinations.
pub mod output;

/// bson dump and reload of a built vocabulary.
pub mod vocabbson;

/// sparse feature file output for classifiers.
pub mod featcsv;
