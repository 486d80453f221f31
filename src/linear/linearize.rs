//! Projection of a prepared instance into a sparse feature vector.
//!
//! Every significant matrix entry contributes its value to the features of the label
//! pairs of its two nodes, pooled by sum or max. A label pair unknown to the vocabulary
//! is dropped silently, that is the intended way novel test time structure disappears
//! instead of erroring.
//!

use std::collections::HashMap;

use ndarray::Array2;
use ndarray_linalg::Scalar;
use num_traits::float::Float;

use rayon::prelude::*;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use super::params::{LinearParams, PoolingMode};
use super::vocabulary::{label_pair_key, FeatureVocabulary};
use crate::graph::instance::GraphInstance;

/// vocabulary rank to pooled value. An absent rank means an implicit zero.
pub type SparseFeatureVector<F> = HashMap<usize, F>;

/// projects one prepared matrix and its labels through a built vocabulary.
///
/// With [PoolingMode::Sum] a feature value is the exact sum of its qualifying entries
/// (summation order is unspecified, the mathematical sum is well defined).
/// With [PoolingMode::Max] it is their maximum, so the result never exceeds the largest
/// contributing entry and is independent of traversal order.
pub fn linearize<F>(mat : &Array2<F>, labels : &[Vec<String>], vocabulary : &FeatureVocabulary, params : &LinearParams) -> SparseFeatureVector<F>
    where F : Float + Scalar {
    //
    let epsil = F::from_f64(params.get_epsil()).unwrap();
    let mut linear = SparseFeatureVector::<F>::new();
    for i in 0..mat.nrows() {
        for j in 0..mat.ncols() {
            if mat[[i,j]] > epsil {
                for label1 in &labels[i] {
                    for label2 in &labels[j] {
                        let key = label_pair_key(label1, label2);
                        // an unseen pair is skipped, the vocabulary is the sole authority
                        if let Some(rank) = vocabulary.get_rank(&key) {
                            let value = linear.entry(rank).or_insert_with(F::zero);
                            match params.get_mode() {
                                PoolingMode::Sum => { *value = *value + mat[[i,j]]; },
                                PoolingMode::Max => {
                                    if mat[[i,j]] > *value {
                                        *value = mat[[i,j]];
                                    }
                                },
                            }
                        }
                    }
                }
            }
        }
    }
    linear
} // end of linearize

/// linearizes one instance, see [linearize].
pub fn linearize_instance<F>(instance : &GraphInstance<F>, vocabulary : &FeatureVocabulary, params : &LinearParams) -> SparseFeatureVector<F>
    where F : Float + Scalar {
    linearize(instance.get_mat(), instance.get_labels(), vocabulary, params)
} // end of linearize_instance

/// linearizes a whole collection, output order follows input order.
/// Instances are independent of each other so the parallel mode just distributes
/// them with rayon over a shared read only vocabulary.
pub fn linearize_all<F>(instances : &[GraphInstance<F>], vocabulary : &FeatureVocabulary, params : &LinearParams) -> Vec<SparseFeatureVector<F>>
    where F : Float + Scalar + Send + Sync {
    //
    let cpu_start = ProcessTime::now();
    let sys_start = SystemTime::now();
    let vectors : Vec<SparseFeatureVector<F>>;
    if params.get_parallel() {
        log::info!("linearize_all parallel over {} instances with {} cpus", instances.len(), num_cpus::get());
        vectors = instances.par_iter().map(|instance| linearize_instance(instance, vocabulary, params)).collect();
    }
    else {
        vectors = instances.iter().map(|instance| linearize_instance(instance, vocabulary, params)).collect();
    }
    log::info!("linearize_all {} instances, sys time(s) {}, cpu time(s) {}", instances.len(),
        sys_start.elapsed().unwrap().as_secs(), cpu_start.elapsed().as_secs());
    vectors
} // end of linearize_all

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::arr2;

    #[allow(dead_code)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn get_pair_instance() -> GraphInstance<f64> {
        let mat = arr2(&[[0., 0.5], [0., 0.]]);
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        GraphInstance::new(mat, labels, 1.).unwrap()
    } // end of get_pair_instance

    #[test]
    fn test_linearize_pair_sum_and_max() {
        //
        log_init_test();
        // a single significant entry, sum and max must both give {0 : 0.5}
        let instance = get_pair_instance();
        let vocabulary = FeatureVocabulary::from_instances([&instance], 1.0E-5);
        //
        let sum_params = LinearParams::new(PoolingMode::Sum, 1.0E-5, false);
        let linear = linearize_instance(&instance, &vocabulary, &sum_params);
        assert_eq!(linear.len(), 1);
        assert!(num_traits::Float::abs(linear[&0] - 0.5) < 1.0E-10);
        //
        let max_params = LinearParams::new(PoolingMode::Max, 1.0E-5, false);
        let linear = linearize_instance(&instance, &vocabulary, &max_params);
        assert_eq!(linear.len(), 1);
        assert!(num_traits::Float::abs(linear[&0] - 0.5) < 1.0E-10);
    } // end of test_linearize_pair_sum_and_max

    #[test]
    fn test_linearize_pooling() {
        //
        log_init_test();
        // two entries fall on the same A _$_ B feature, sum accumulates them,
        // max keeps the largest one
        let mat = arr2(&[
            [0. , 0. , 0.3 ],
            [0. , 0. , 0.4 ],
            [0. , 0. , 0.  ]]);
        let labels = vec![
            vec![String::from("A")],
            vec![String::from("A")],
            vec![String::from("B")]];
        let instance = GraphInstance::new(mat, labels, 1.).unwrap();
        let vocabulary = FeatureVocabulary::from_instances([&instance], 1.0E-5);
        assert_eq!(vocabulary.nb_features(), 1);
        //
        let linear = linearize_instance(&instance, &vocabulary, &LinearParams::new(PoolingMode::Sum, 1.0E-5, false));
        let check = num_traits::Float::abs(linear[&0] - 0.7);
        log::debug!("sum check : {}", check);
        assert!(check < 1.0E-10);
        //
        let linear = linearize_instance(&instance, &vocabulary, &LinearParams::new(PoolingMode::Max, 1.0E-5, false));
        let check = num_traits::Float::abs(linear[&0] - 0.4);
        log::debug!("max check : {}", check);
        assert!(check < 1.0E-10);
    } // end of test_linearize_pooling

    #[test]
    fn test_linearize_drops_unseen_pairs() {
        //
        log_init_test();
        // the vocabulary is built on one instance, a later instance with a novel label
        // must not contribute any new feature however large its weight
        let train = get_pair_instance();
        let vocabulary = FeatureVocabulary::from_instances([&train], 1.0E-5);
        //
        let mat = arr2(&[[0., 0.9], [0.8, 0.]]);
        let labels = vec![vec![String::from("A")], vec![String::from("Z")]];
        let test = GraphInstance::new(mat, labels, -1.).unwrap();
        let linear = linearize_instance(&test, &vocabulary, &LinearParams::default());
        // A _$_ Z and Z _$_ A are unknown, nothing survives
        assert!(linear.is_empty());
    } // end of test_linearize_drops_unseen_pairs

    #[test]
    fn test_linearize_all_preserves_order() {
        //
        log_init_test();
        //
        let instance1 = get_pair_instance();
        let mat = arr2(&[[0., 0.25], [0., 0.]]);
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        let instance2 = GraphInstance::new(mat, labels, -1.).unwrap();
        let instances = vec![instance1, instance2];
        let vocabulary = FeatureVocabulary::from_instances(instances.iter(), 1.0E-5);
        //
        let vectors = linearize_all(&instances, &vocabulary, &LinearParams::default());
        assert_eq!(vectors.len(), 2);
        assert!(num_traits::Float::abs(vectors[0][&0] - 0.5) < 1.0E-10);
        assert!(num_traits::Float::abs(vectors[1][&0] - 0.25) < 1.0E-10);
        // parallel mode must give the same vectors in the same order
        let parallel = linearize_all(&instances, &vocabulary, &LinearParams::new(PoolingMode::Sum, 1.0E-5, true));
        assert_eq!(parallel.len(), 2);
        assert!(num_traits::Float::abs(parallel[0][&0] - 0.5) < 1.0E-10);
        assert!(num_traits::Float::abs(parallel[1][&0] - 0.25) < 1.0E-10);
    } // end of test_linearize_all_preserves_order

} // end of mod tests
