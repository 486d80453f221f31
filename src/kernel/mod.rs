//! This module implements the walk kernel transform of adjacency matrices.
//!
//! The transform turns single edge affinities into a node to node proximity taking
//! into account walks of every positive length, so that feature extraction can reward
//! multi hop relationships without enumerating paths explicitly.
//!
//! Some References :
//!
//! - A graph kernel for protein-protein interaction extraction.
//!     Airola, Pyysalo, Björne, Pahikkala, Ginter, Salakoski 2008.
//     all-paths graph kernel over dependency parses, the matrix form computed here.
//!
//! - Learning Semantic Similarity. Kandola, Shawe-Taylor, Cristianini 2002.
//     the Neumann kernel as a closed form of the diffusion series.

/// Defines the all walks matrix preparation.
pub mod walk;
