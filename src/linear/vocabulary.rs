//! The label pair vocabulary.
//!
//! Scanning a fixed collection of prepared instances, every ordered label pair observed
//! on a significant matrix entry gets a rank, assigned in first seen order and never
//! reassigned. The scan order (instances, then matrix indices, then label sets) is fixed,
//! so rebuilding from the same collection yields the same mapping.
//!
//! Once built the vocabulary is read only and shared by all later linearizations,
//! possibly running concurrently.
//!

use indexmap::IndexMap;

use ndarray_linalg::Scalar;
use num_traits::float::Float;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use crate::graph::instance::GraphInstance;

/// separator between the two labels of a pair key. Label strings must not contain it.
pub const LABEL_SEP : &str = "_$_";

/// the feature key made of an ordered label pair.
pub fn label_pair_key(label1 : &str, label2 : &str) -> String {
    debug_assert!(!label1.contains(LABEL_SEP) && !label2.contains(LABEL_SEP));
    let mut key = String::with_capacity(label1.len() + LABEL_SEP.len() + label2.len());
    key.push_str(label1);
    key.push_str(LABEL_SEP);
    key.push_str(label2);
    key
} // end of label_pair_key

/// maps label pair keys to feature ranks.
/// Ranks are dense, non negative and grow in first seen order, the IndexMap keeps
/// that order so dumps and rebuilds are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVocabulary {
    /// key to rank, iteration follows rank order.
    feature_map : IndexMap<String, usize>,
    /// next unused rank.
    feature_counter : usize,
} // end of struct FeatureVocabulary


impl FeatureVocabulary {

    pub fn new() -> Self {
        FeatureVocabulary{feature_map : IndexMap::new(), feature_counter : 0}
    }

    /// builds the vocabulary over a collection of prepared instances.
    /// Every matrix entry above epsil contributes all the label pairs of its two nodes.
    /// This is the one sequential pass of the pipeline, the rank assignment depends on
    /// the traversal order.
    pub fn from_instances<'a, F>(instances : impl IntoIterator<Item = &'a GraphInstance<F>>, epsil : f64) -> Self
        where F : Float + Scalar + 'a {
        //
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let mut vocabulary = FeatureVocabulary::new();
        let mut nb_instances = 0usize;
        for instance in instances {
            vocabulary.scan_instance(instance, epsil);
            nb_instances += 1;
        }
        log::info!("vocabulary built : {} features from {} instances, sys time(s) {}, cpu time(s) {}",
            vocabulary.nb_features(), nb_instances,
            sys_start.elapsed().unwrap().as_secs(), cpu_start.elapsed().as_secs());
        vocabulary
    } // end of from_instances

    // registers every label pair key sitting on an entry above epsil.
    // The prepared matrices are mostly dense so this is a full n*n scan.
    fn scan_instance<F>(&mut self, instance : &GraphInstance<F>, epsil : f64)
        where F : Float + Scalar {
        let mat = instance.get_mat();
        let labels = instance.get_labels();
        let epsil_f = F::from_f64(epsil).unwrap();
        for i in 0..mat.nrows() {
            for j in 0..mat.ncols() {
                if mat[[i,j]] > epsil_f {
                    for label1 in &labels[i] {
                        for label2 in &labels[j] {
                            let key = label_pair_key(label1, label2);
                            if !self.feature_map.contains_key(&key) {
                                self.insert_key(key);
                            }
                        }
                    }
                }
            }
        }
    } // end of scan_instance

    // assigns the next rank to a new key. The caller checks the key is unseen.
    pub(crate) fn insert_key(&mut self, key : String) -> usize {
        let rank = self.feature_counter;
        let previous = self.feature_map.insert(key, rank);
        assert!(previous.is_none());
        self.feature_counter += 1;
        rank
    } // end of insert_key

    /// rank of a key, None if the pair was never observed at build time.
    pub fn get_rank(&self, key : &str) -> Option<usize> {
        self.feature_map.get(key).copied()
    }

    /// number of known label pairs (also the next unused rank).
    pub fn nb_features(&self) -> usize {
        self.feature_counter
    }

    /// key holding a given rank.
    pub fn get_key(&self, rank : usize) -> Option<&String> {
        self.feature_map.get_index(rank).map(|(key, _)| key)
    }

    /// iteration over (key, rank) in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &usize)> {
        self.feature_map.iter()
    }

} // end of impl FeatureVocabulary

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
        // the prepared form of a single directed edge between two labelled nodes
        let mat = arr2(&[[0., 0.5], [0., 0.]]);
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        GraphInstance::new(mat, labels, 1.).unwrap()
    } // end of get_pair_instance

    #[test]
    fn test_vocabulary_single_pair() {
        //
        log_init_test();
        //
        let instance = get_pair_instance();
        let vocabulary = FeatureVocabulary::from_instances([&instance], 1.0E-5);
        // only the (0,1) entry is significant, so only A _$_ B is known
        assert_eq!(vocabulary.nb_features(), 1);
        assert_eq!(vocabulary.get_rank("A_$_B"), Some(0));
        assert_eq!(vocabulary.get_rank("B_$_A"), None);
        assert_eq!(vocabulary.get_rank("A_$_A"), None);
    } // end of test_vocabulary_single_pair

    #[test]
    fn test_vocabulary_first_seen_order() {
        //
        log_init_test();
        // multi labelled nodes, ranks must follow the scan order over label sets
        let mat = arr2(&[[0., 0.5], [0., 0.]]);
        let labels = vec![
            vec![String::from("kinase"), String::from("NN")],
            vec![String::from("binds"), String::from("VB")]];
        let instance = GraphInstance::new(mat, labels, 1.).unwrap();
        let vocabulary = FeatureVocabulary::from_instances([&instance], 1.0E-5);
        assert_eq!(vocabulary.nb_features(), 4);
        assert_eq!(vocabulary.get_rank("kinase_$_binds"), Some(0));
        assert_eq!(vocabulary.get_rank("kinase_$_VB"), Some(1));
        assert_eq!(vocabulary.get_rank("NN_$_binds"), Some(2));
        assert_eq!(vocabulary.get_rank("NN_$_VB"), Some(3));
        assert_eq!(vocabulary.get_key(2), Some(&String::from("NN_$_binds")));
    } // end of test_vocabulary_first_seen_order

    #[test]
    fn test_vocabulary_rebuild_identical() {
        //
        log_init_test();
        // same instances in the same order, same mapping
        let instance1 = get_pair_instance();
        let mat = arr2(&[[0., 0.3], [0.2, 0.]]);
        let labels = vec![vec![String::from("C")], vec![String::from("A")]];
        let instance2 = GraphInstance::new(mat, labels, -1.).unwrap();
        //
        let vocabulary1 = FeatureVocabulary::from_instances([&instance1, &instance2], 1.0E-5);
        let vocabulary2 = FeatureVocabulary::from_instances([&instance1, &instance2], 1.0E-5);
        assert_eq!(vocabulary1.nb_features(), vocabulary2.nb_features());
        for (rank, (key, _)) in vocabulary1.iter().enumerate() {
            assert_eq!(vocabulary2.get_rank(key), Some(rank));
            assert_eq!(vocabulary2.get_key(rank), Some(key));
        }
    } // end of test_vocabulary_rebuild_identical

    #[test]
    fn test_vocabulary_threshold_excludes() {
        //
        log_init_test();
        // an entry below the threshold must not contribute any pair
        let mat = arr2(&[[0., 1.0E-7], [0., 0.]]);
        let labels = vec![vec![String::from("A")], vec![String::from("B")]];
        let instance = GraphInstance::new(mat, labels, 1.).unwrap();
        let vocabulary = FeatureVocabulary::from_instances([&instance], 1.0E-5);
        assert_eq!(vocabulary.nb_features(), 0);
    } // end of test_vocabulary_threshold_excludes

} // end of mod tests
