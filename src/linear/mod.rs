//! This module gathers everything that turns a prepared (all walks) matrix and its
//! node labels into a sparse numeric feature vector usable by a kernel based classifier.
//!
//! The vocabulary is built once over a fixed training collection and is the sole
//! authority over which label pairs are known. It is then shared read only by every
//! linearization call, so feature ranks are comparable across instances.

/// Defines pooling mode and linearization parameters.
pub mod params;

/// Defines the label pair vocabulary.
pub mod vocabulary;

/// Defines projection of an instance into a sparse feature vector.
pub mod linearize;
