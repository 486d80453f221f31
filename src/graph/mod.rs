//! Data model for per pair dependency graphs and the corpus driving glue.
//!
//! A sentence pair is materialized by a [GraphInstance](instance::GraphInstance) :
//! a weighted node to node affinity matrix, one label set per node and the
//! classification target of the pair.
//! The adjacency matrix construction itself (node count convention, edge weighting)
//! belongs to an external builder, see [AdjacencyBuilder](corpus::AdjacencyBuilder).

/// Defines the per pair unit of work.
pub mod instance;

/// Defines the corpus nesting and the builder driving loop.
pub mod corpus;
