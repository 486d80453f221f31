//! All walks matrix preparation.
//!
//! The raw adjacency matrix W of a sentence graph carries single edge affinities,
//! entries typically in \[0,1\]. The preparation replaces it by the matrix summing the
//! weighted contributions of all walks of any positive length between two nodes.
//! This step is purely numeric, labels play no role here.
//!

use anyhow::anyhow;

use ndarray::Array2;
use ndarray_linalg::{Inverse, Lapack, Scalar};

use num_traits::float::Float;

use rayon::prelude::*;

use crate::graph::instance::GraphInstance;

/// How the all walks matrix is evaluated.
///
/// The closed form needs one LAPACK inversion and is exact. The truncated evaluation
/// avoids the inversion and can be preferred for large well conditioned graphs where
/// long walks contribute nothing measurable.
#[derive(Debug, Copy, Clone)]
pub enum WalkSolver {
    /// closed form through direct inversion.
    DirectInverse,
    /// iterative evaluation of the series, the argument is the largest walk length summed.
    TruncatedNeumann(usize),
} // end of WalkSolver

/// Converts a raw adjacency matrix into its all walks form.
#[derive(Debug, Copy, Clone)]
pub struct WalkKernel {
    /// evaluation strategy
    solver : WalkSolver,
} // end of struct WalkKernel

impl Default for WalkKernel {
    fn default() -> Self {
        WalkKernel{solver : WalkSolver::DirectInverse}
    }
}

impl WalkKernel {

    pub fn new(solver : WalkSolver) -> Self {
        WalkKernel{solver}
    }

    ///
    pub fn get_solver(&self) -> WalkSolver { self.solver }

    #[cfg_attr(doc, katexit::katexit)]
    /// computes the all walks matrix
    /// $$ K = (I - W)^{-1} - I = \sum_{k \geq 1} W^k $$
    /// The geometric series identity holds when the spectral radius of $W$ is below 1,
    /// which the builder weighting is expected to guarantee.
    /// Subtracting the identity removes the zero length walk term.
    ///
    /// A singular $I - W$ (an eigenvalue of W exactly 1) makes the inversion fail.
    /// The failure is returned to the caller which may exclude the instance and go on
    /// with the rest of the corpus, retrying cannot succeed.
    pub fn prepare_matrix<F>(&self, w : &Array2<F>) -> Result<Array2<F>, anyhow::Error>
        where F : Float + Scalar + Lapack + ndarray::ScalarOperand + ndarray::LinalgScalar {
        //
        let (nb_row, nb_col) = w.dim();
        if nb_row != nb_col {
            log::error!("prepare_matrix received a non square matrix : {} x {}", nb_row, nb_col);
            return Err(anyhow!("prepare_matrix received a non square matrix : {} x {}", nb_row, nb_col));
        }
        //
        match self.solver {
            WalkSolver::DirectInverse => {
                let eye = Array2::<F>::eye(nb_row);
                let to_invert = &eye - w;
                let inverse = match to_invert.inv() {
                    Ok(inverse) => inverse,
                    Err(e)      => {
                        log::error!("prepare_matrix inversion failed, (I - W) is singular : {}", e);
                        return Err(anyhow!("prepare_matrix inversion failed, (I - W) is singular : {}", e));
                    },
                };
                Ok(inverse - eye)
            },
            WalkSolver::TruncatedNeumann(nb_iter) => {
                if nb_iter == 0 {
                    return Err(anyhow!("truncated evaluation needs at least one term"));
                }
                // sum W^k for k in 1..=nb_iter
                let mut term = w.to_owned();
                let mut walks = w.to_owned();
                for _ in 1..nb_iter {
                    term = term.dot(w);
                    walks = walks + &term;
                }
                Ok(walks)
            },
        }
    } // end of prepare_matrix

    /// substitutes, in place, the raw adjacency matrix of an instance by its all walks form.
    /// Labels and output are left untouched.
    pub fn kernelize<F>(&self, instance : &mut GraphInstance<F>) -> Result<(), anyhow::Error>
        where F : Float + Scalar + Lapack + ndarray::ScalarOperand + ndarray::LinalgScalar {
        let walks = self.prepare_matrix(instance.get_mat())?;
        instance.set_mat(walks);
        Ok(())
    } // end of kernelize

} // end of impl WalkKernel

/// kernelizes a batch of instances. Instances are independent so the parallel mode
/// just distributes them with rayon, each inversion being O(n^3) anyway.
/// The result vector follows the input order, a failed instance keeps its error
/// so the caller can exclude it and keep the others.
pub fn kernelize_all<F>(kernel : &WalkKernel, instances : &mut [GraphInstance<F>], parallel : bool) -> Vec<Result<(), anyhow::Error>>
    where F : Float + Scalar + Lapack + ndarray::ScalarOperand + ndarray::LinalgScalar + Send + Sync {
    //
    if parallel {
        log::info!("kernelize_all parallel over {} instances with {} cpus", instances.len(), num_cpus::get());
        instances.par_iter_mut().map(|instance| kernel.kernelize(instance)).collect()
    }
    else {
        instances.iter_mut().map(|instance| kernel.kernelize(instance)).collect()
    }
} // end of kernelize_all

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    #[allow(dead_code)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_walk_nilpotent_pair() {
        //
        log_init_test();
        // a single directed edge, all walks of length >= 2 vanish so K must equal W
        let w = ndarray::arr2(&[[0., 0.5], [0., 0.]]);
        let kernel = WalkKernel::default();
        let walks = kernel.prepare_matrix(&w).unwrap();
        //
        let check = num_traits::Float::abs(walks[[0,1]] - 0.5);
        log::debug!("check (0,1): {}", check);
        assert!(check < 1.0E-10);
        assert!(num_traits::Float::abs(walks[[0,0]]) < 1.0E-10);
        assert!(num_traits::Float::abs(walks[[1,0]]) < 1.0E-10);
        assert!(num_traits::Float::abs(walks[[1,1]]) < 1.0E-10);
    } // end of test_walk_nilpotent_pair

    #[test]
    fn test_walk_zero_matrix() {
        //
        log_init_test();
        // no edges, no walks
        let w = Array2::<f64>::zeros((4,4));
        let kernel = WalkKernel::default();
        let walks = kernel.prepare_matrix(&w).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert!(num_traits::Float::abs(walks[[i,j]]) < 1.0E-10);
            }
        }
    } // end of test_walk_zero_matrix

    #[test]
    fn test_walk_geometric_loop() {
        //
        log_init_test();
        // one node with a self affinity a sums to a/(1-a). For a = 0.5 that is 1.
        let w = ndarray::arr2(&[[0.5]]);
        let kernel = WalkKernel::default();
        let walks = kernel.prepare_matrix(&w).unwrap();
        let check = num_traits::Float::abs(walks[[0,0]] - 1.);
        log::debug!("check (0,0): {}", check);
        assert!(check < 1.0E-10);
    } // end of test_walk_geometric_loop

    #[test]
    fn test_walk_truncated_matches_inverse() {
        //
        log_init_test();
        // row sums stay well below 1 so the series converges fast,
        // the truncated evaluation must match the closed form within tolerance
        let w = ndarray::arr2(&[
            [0.  , 0.4 , 0.1 ],
            [0.2 , 0.  , 0.3 ],
            [0.1 , 0.2 , 0.  ]]);
        let direct = WalkKernel::new(WalkSolver::DirectInverse).prepare_matrix(&w).unwrap();
        let truncated = WalkKernel::new(WalkSolver::TruncatedNeumann(80)).prepare_matrix(&w).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let check = num_traits::Float::abs(direct[[i,j]] - truncated[[i,j]]);
                assert!(check < 1.0E-8);
            }
        }
    } // end of test_walk_truncated_matches_inverse

    #[test]
    fn test_walk_singular_rejected() {
        //
        log_init_test();
        // eigenvalue exactly 1, (I - W) is singular and the inversion must fail
        let w = ndarray::arr2(&[[1.]]);
        let kernel = WalkKernel::default();
        let walks = kernel.prepare_matrix(&w);
        assert!(walks.is_err());
    } // end of test_walk_singular_rejected

    #[test]
    fn test_walk_non_square_rejected() {
        //
        log_init_test();
        //
        let w = Array2::<f64>::zeros((3,2));
        let kernel = WalkKernel::default();
        assert!(kernel.prepare_matrix(&w).is_err());
    } // end of test_walk_non_square_rejected

} // end of mod tests
