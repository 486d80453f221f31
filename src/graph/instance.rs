//! This module describes the raw unit of work : one candidate pair of a sentence
//! represented by a weighted adjacency matrix over the sentence graph nodes,
//! a list of label sets (one per node) and the gold output of the pair.
//!
//! A node can carry several simultaneous discrete labels (lexical form, part of speech,
//! entity type, dependency relation). Labels of a node are kept in a Vec to get a fixed
//! iteration order, entries are expected distinct.
//!

use anyhow::anyhow;

use ndarray::Array2;
use num_traits::float::Float;
use sprs::{CsMatI, TriMatI};

/// One candidate pair : affinity matrix, node labels and target value.
///
/// The matrix starts as the raw builder produced adjacency matrix and is substituted
/// in place by its all walks form, see [WalkKernel](crate::kernel::walk::WalkKernel).
/// Apart from that substitution an instance is never mutated after creation.
#[derive(Debug, Clone)]
pub struct GraphInstance<F> {
    /// node to node affinity weights, square. Dimension is whatever the builder produced.
    mat : Array2<F>,
    /// labels\[i\] holds the labels of node i.
    labels : Vec<Vec<String>>,
    /// classification (or regression) target of the pair. Opaque, passed through unchanged.
    output : f64,
} // end of struct GraphInstance

impl<F> GraphInstance<F>
    where F : Float {

    /// allocates an instance after checking the shape contract :
    /// the matrix must be square and there must be exactly one label set per row.
    /// A violation is rejected here, before any numeric work is attempted.
    pub fn new(mat : Array2<F>, labels : Vec<Vec<String>>, output : f64) -> Result<Self, anyhow::Error> {
        let (nb_row, nb_col) = mat.dim();
        if nb_row != nb_col {
            log::error!("GraphInstance::new adjacency matrix is not square : {} x {}", nb_row, nb_col);
            return Err(anyhow!("adjacency matrix is not square : {} x {}", nb_row, nb_col));
        }
        if labels.len() != nb_row {
            log::error!("GraphInstance::new got {} label sets for a matrix of dimension {}", labels.len(), nb_row);
            return Err(anyhow!("got {} label sets for a matrix of dimension {}", labels.len(), nb_row));
        }
        Ok(GraphInstance{mat, labels, output})
    } // end of new

    /// builders naturally produce sparse affinities in triplet form,
    /// the matrix is densified here as the kernel transform works on dense storage anyway.
    pub fn from_trimat(trimat : &TriMatI<F, usize>, labels : Vec<Vec<String>>, output : f64) -> Result<Self, anyhow::Error> {
        let csr_mat : CsMatI<F, usize> = trimat.to_csr();
        GraphInstance::new(csr_mat.to_dense(), labels, output)
    } // end of from_trimat

    /// get a reference on the affinity matrix
    pub fn get_mat(&self) -> &Array2<F> {
        &self.mat
    }

    /// get node label sets
    pub fn get_labels(&self) -> &[Vec<String>] {
        &self.labels
    }

    /// get the target value of the pair
    pub fn get_output(&self) -> f64 {
        self.output
    }

    /// dimension of the matrix. The node count convention itself belongs to the builder.
    pub fn get_nb_nodes(&self) -> usize {
        self.mat.nrows()
    }

    // in place matrix substitution used by the kernel transform, dimension is preserved
    pub(crate) fn set_mat(&mut self, mat : Array2<F>) {
        assert_eq!(mat.dim(), self.mat.dim());
        self.mat = mat;
    }

} // end of impl GraphInstance

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    #[allow(dead_code)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_instance_shape_ok() {
        log_init_test();
        //
        let mat = Array2::<f64>::zeros((3,3));
        let labels = vec![vec![String::from("A")], vec![String::from("B")], vec![String::from("C")]];
        let instance = GraphInstance::new(mat, labels, 1.);
        assert!(instance.is_ok());
        assert_eq!(instance.unwrap().get_nb_nodes(), 3);
    } // end of test_instance_shape_ok

    #[test]
    fn test_instance_rejects_label_mismatch() {
        log_init_test();
        // 3x3 matrix but only 2 label sets, must be rejected before any numeric work
        let mat = Array2::<f64>::zeros((3,3));
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        let instance = GraphInstance::new(mat, labels, 1.);
        assert!(instance.is_err());
    } // end of test_instance_rejects_label_mismatch

    #[test]
    fn test_instance_rejects_non_square() {
        log_init_test();
        //
        let mat = Array2::<f64>::zeros((3,2));
        let labels = vec![vec![String::from("A")], vec![String::from("B")], vec![String::from("C")]];
        let instance = GraphInstance::new(mat, labels, 1.);
        assert!(instance.is_err());
    } // end of test_instance_rejects_non_square

    #[test]
    fn test_instance_from_trimat() {
        log_init_test();
        //
        let mut trimat = TriMatI::<f64, usize>::new((2,2));
        trimat.add_triplet(0, 1, 0.5);
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        let instance = GraphInstance::from_trimat(&trimat, labels, -1.).unwrap();
        let mat = instance.get_mat();
        assert!(num_traits::Float::abs(mat[[0,1]] - 0.5) < 1.0E-10);
        assert!(num_traits::Float::abs(mat[[0,0]]) < 1.0E-10);
        assert!(num_traits::Float::abs(mat[[1,0]]) < 1.0E-10);
    } // end of test_instance_from_trimat

} // end of mod tests
