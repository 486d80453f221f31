//! Corpus driving glue.
//!
//! A corpus is nested as document id -> sentence id -> pair id. The analysis of a
//! sentence (tokens, dependencies, entities, mappings) and the strategy building a raw
//! adjacency matrix from it are both external, the driver only owns the loop :
//! for each candidate pair call the builder, prepare the matrix, store the instance.
//! The same instances are later linearized with one shared vocabulary.
//!
//! A pair whose construction or preparation fails is logged with its identifier and
//! skipped, the rest of the corpus goes on.
//!

use indexmap::IndexMap;

use ndarray_linalg::{Lapack, Scalar};
use num_traits::float::Float;

use rayon::prelude::*;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use super::instance::GraphInstance;
use crate::kernel::walk::WalkKernel;
use crate::linear::linearize::{linearize_instance, SparseFeatureVector};
use crate::linear::params::LinearParams;
use crate::linear::vocabulary::FeatureVocabulary;

/// contract of the external adjacency matrix builder.
///
/// S is the per sentence analysis owned by the caller. The builder owns the node count
/// convention and the edge weighting, the core only checks the shape coherence of what
/// it receives (square matrix, one label set per row).
pub trait AdjacencyBuilder<S, F> {
    /// produces the raw (matrix, labels, output) instance of one candidate pair.
    fn build_instance(&self, analysis : &S, pair_id : &str) -> Result<GraphInstance<F>, anyhow::Error>;
} // end of trait AdjacencyBuilder

/// one parsed sentence with its candidate pair identifiers.
pub struct SentenceData<S> {
    /// sentence identifier, e.g "IEPA.d23.s0"
    pub sent_id : String,
    /// the analysis handed over to the builder, opaque to the driver.
    pub analysis : S,
    /// candidate pair identifiers, e.g "IEPA.d23.s0.p0"
    pub pairs : Vec<String>,
} // end of struct SentenceData

/// one document of a corpus.
pub struct DocumentData<S> {
    /// document identifier, e.g "IEPA.d23"
    pub doc_id : String,
    ///
    pub sentences : Vec<SentenceData<S>>,
} // end of struct DocumentData

/// the instances of a processed corpus, nested as doc id -> sentence id -> pair id.
/// IndexMap keeps corpus order so later flattenings are deterministic.
pub struct CorpusInstances<F> {
    documents : IndexMap<String, IndexMap<String, IndexMap<String, GraphInstance<F>>>>,
    nb_pairs : usize,
} // end of struct CorpusInstances


impl<F> CorpusInstances<F>
    where F : Float + Scalar {

    fn new() -> Self {
        CorpusInstances{documents : IndexMap::new(), nb_pairs : 0}
    }

    ///
    pub fn get_nb_documents(&self) -> usize { self.documents.len() }

    /// number of pairs that survived processing.
    pub fn get_nb_pairs(&self) -> usize { self.nb_pairs }

    /// access to one pair.
    pub fn get_pair(&self, doc_id : &str, sent_id : &str, pair_id : &str) -> Option<&GraphInstance<F>> {
        self.documents.get(doc_id)?.get(sent_id)?.get(pair_id)
    }

    /// flattened (pair id, instance) sequence in corpus order.
    pub fn get_instances(&self) -> Vec<(&String, &GraphInstance<F>)> {
        let mut instances = Vec::with_capacity(self.nb_pairs);
        for (_, sentences) in self.documents.iter() {
            for (_, pairs) in sentences.iter() {
                for (pair_id, instance) in pairs.iter() {
                    instances.push((pair_id, instance));
                }
            }
        }
        instances
    } // end of get_instances

    /// builds the vocabulary over all surviving pairs, in corpus order.
    pub fn build_vocabulary(&self, epsil : f64) -> FeatureVocabulary {
        FeatureVocabulary::from_instances(self.get_instances().into_iter().map(|(_, instance)| instance), epsil)
    } // end of build_vocabulary

    /// linearizes every pair through a shared vocabulary.
    /// Results are keyed by pair id, in corpus order.
    pub fn linearize(&self, vocabulary : &FeatureVocabulary, params : &LinearParams) -> IndexMap<String, SparseFeatureVector<F>>
        where F : Send + Sync {
        let instances = self.get_instances();
        let vectors : Vec<SparseFeatureVector<F>>;
        if params.get_parallel() {
            log::info!("corpus linearization parallel over {} pairs with {} cpus", instances.len(), num_cpus::get());
            vectors = instances.par_iter().map(|(_, instance)| linearize_instance(instance, vocabulary, params)).collect();
        }
        else {
            vectors = instances.iter().map(|(_, instance)| linearize_instance(instance, vocabulary, params)).collect();
        }
        instances.iter().map(|(pair_id, _)| (*pair_id).clone()).zip(vectors).collect()
    } // end of linearize

} // end of impl CorpusInstances


/// drives the external builder over a corpus.
pub struct CorpusDriver<B> {
    /// the external adjacency matrix builder.
    builder : B,
    /// matrix preparation applied to each built pair.
    kernel : WalkKernel,
    /// prepare matrices at build time. The standard pipeline does, keeping raw
    /// matrices is useful to inspect builder output.
    prep_matrix : bool,
    /// process only the first documents if set.
    limit : Option<usize>,
} // end of struct CorpusDriver


impl<B> CorpusDriver<B> {

    pub fn new(builder : B, kernel : WalkKernel, prep_matrix : bool, limit : Option<usize>) -> Self {
        CorpusDriver{builder, kernel, prep_matrix, limit}
    }

    ///
    pub fn get_kernel(&self) -> &WalkKernel { &self.kernel }

    /// builds (and by default prepares) one instance per candidate pair of the corpus.
    /// A failing pair is logged with its identifier and skipped.
    pub fn process_documents<S, F>(&self, documents : &[DocumentData<S>]) -> CorpusInstances<F>
        where B : AdjacencyBuilder<S, F>,
              F : Float + Scalar + Lapack + ndarray::ScalarOperand + ndarray::LinalgScalar {
        //
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        log::info!("processing {} documents", documents.len());
        //
        let mut corpus = CorpusInstances::<F>::new();
        let mut document_count = 0usize;
        for document in documents {
            if let Some(limit) = self.limit {
                if document_count >= limit {
                    log::info!("document limit {} reached", limit);
                    break;
                }
            }
            log::debug!("processing document {} : {}", document_count + 1, document.doc_id);
            let mut doc_map = IndexMap::<String, IndexMap<String, GraphInstance<F>>>::with_capacity(document.sentences.len());
            for sentence in &document.sentences {
                let sent_map = self.process_sentence(sentence);
                corpus.nb_pairs += sent_map.len();
                doc_map.insert(sentence.sent_id.clone(), sent_map);
            }
            corpus.documents.insert(document.doc_id.clone(), doc_map);
            document_count += 1;
        }
        log::info!("processed {} documents, {} pairs, sys time(s) {}, cpu time(s) {}",
            document_count, corpus.nb_pairs,
            sys_start.elapsed().unwrap().as_secs(), cpu_start.elapsed().as_secs());
        corpus
    } // end of process_documents

    // builds the instances of one sentence, skipping failed pairs
    fn process_sentence<S, F>(&self, sentence : &SentenceData<S>) -> IndexMap<String, GraphInstance<F>>
        where B : AdjacencyBuilder<S, F>,
              F : Float + Scalar + Lapack + ndarray::ScalarOperand + ndarray::LinalgScalar {
        //
        let mut sent_map = IndexMap::<String, GraphInstance<F>>::with_capacity(sentence.pairs.len());
        for pair_id in &sentence.pairs {
            let mut instance = match self.builder.build_instance(&sentence.analysis, pair_id) {
                Ok(instance) => instance,
                Err(e)       => {
                    log::error!("builder failed for pair {} : {}", pair_id, e);
                    continue;
                },
            };
            if self.prep_matrix {
                if let Err(e) = self.kernel.kernelize(&mut instance) {
                    log::error!("matrix preparation failed for pair {} : {}", pair_id, e);
                    continue;
                }
            }
            sent_map.insert(pair_id.clone(), instance);
        }
        sent_map
    } // end of process_sentence

} // end of impl CorpusDriver

//===============================================================

// end of mod tests
