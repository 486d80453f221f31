//! an executable running the full linearization pipeline on a synthetic corpus
//! example usage:
//! linearize --docs 20 --mode sum --parallel
//! linearize --docs 50 --mode max --epsil 0.00001 --vocab vocabulary --features features.txt
//!
//! The corpus reader and the real adjacency matrix builders live with the corpus
//! preprocessing tools, so the builder here fabricates reproducible dependency like
//! sentence graphs. It still exercises the whole pipeline : build, matrix preparation,
//! vocabulary, linearization and dumps.
//!

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use std::str::FromStr;

use walkfeat::prelude::*;

// lexical and syntactic pools the synthetic sentences draw from
static LEXICON : [&str; 8] = ["kinase", "protein", "binds", "activates", "inhibits", "receptor", "complex", "ligand"];
static POS : [&str; 4] = ["NN", "VB", "IN", "JJ"];
static DEPREL : [&str; 5] = ["nsubj", "dobj", "prep", "amod", "conj"];

/// per sentence analysis handed to the builder
struct SyntheticAnalysis {
    nb_tokens : usize,
    seed : u64,
}

/// fabricates a dependency chain graph for every candidate pair.
/// Node layout follows the usual convention : one node per token, one shadow node per
/// token and one node per dependency. Out degrees stay at most 2 and weights below
/// 0.45 so row sums stay below 1 and the walk series converges.
struct SyntheticBuilder;

impl SyntheticBuilder {
    // a cheap deterministic mix of the sentence seed and the pair id
    fn pair_seed(analysis_seed : u64, pair_id : &str) -> u64 {
        pair_id.bytes().fold(analysis_seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
    }
} // end of impl SyntheticBuilder

impl AdjacencyBuilder<SyntheticAnalysis, f64> for SyntheticBuilder {

    fn build_instance(&self, analysis : &SyntheticAnalysis, pair_id : &str) -> Result<GraphInstance<f64>, anyhow::Error> {
        let nb_tokens = analysis.nb_tokens;
        if nb_tokens < 2 {
            return Err(anyhow!("pair {} : a candidate pair needs at least 2 tokens", pair_id));
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(SyntheticBuilder::pair_seed(analysis.seed, pair_id));
        let nb_deps = nb_tokens - 1;
        // token i, then its shadow at nb_tokens + i, then dependency d at 2*nb_tokens + d
        let node_count = 2 * nb_tokens + nb_deps;
        let mut trimat = sprs::TriMatI::<f64, usize>::new((node_count, node_count));
        for d in 0..nb_deps {
            let dep_node = 2 * nb_tokens + d;
            trimat.add_triplet(d, dep_node, rng.gen_range(0.05..0.45));
            trimat.add_triplet(dep_node, d + 1, rng.gen_range(0.05..0.45));
            // shadow chain carries the same structure with its own weights
            trimat.add_triplet(nb_tokens + d, dep_node, rng.gen_range(0.05..0.45));
            trimat.add_triplet(dep_node, nb_tokens + d + 1, rng.gen_range(0.05..0.45));
        }
        // the two candidate entities of the pair
        let entity1 = rng.gen_range(0..nb_tokens);
        let mut entity2 = rng.gen_range(0..nb_tokens);
        if entity2 == entity1 {
            entity2 = (entity1 + 1) % nb_tokens;
        }
        //
        let mut labels = Vec::<Vec<String>>::with_capacity(node_count);
        for i in 0..nb_tokens {
            let lex = LEXICON[rng.gen_range(0..LEXICON.len())];
            let pos = POS[rng.gen_range(0..POS.len())];
            let mut token_labels = vec![format!("tok_{}", lex), String::from(pos)];
            if i == entity1 {
                token_labels.push(String::from("PROTEIN1"));
            } else if i == entity2 {
                token_labels.push(String::from("PROTEIN2"));
            }
            labels.push(token_labels);
        }
        for i in 0..nb_tokens {
            // shadow copy keeps only the marked role
            if i == entity1 {
                labels.push(vec![String::from("$$PROTEIN1")]);
            } else if i == entity2 {
                labels.push(vec![String::from("$$PROTEIN2")]);
            } else {
                labels.push(vec![String::from("$$token")]);
            }
        }
        for _ in 0..nb_deps {
            labels.push(vec![String::from(DEPREL[rng.gen_range(0..DEPREL.len())])]);
        }
        //
        let output = if rng.gen_range(0..2) == 0 { 1. } else { -1. };
        GraphInstance::from_trimat(&trimat, labels, output)
    } // end of build_instance

} // end of impl AdjacencyBuilder for SyntheticBuilder


// fabricates the corpus skeleton : documents, sentences, candidate pair ids
fn make_documents(nb_docs : usize, seed : u64) -> Vec<DocumentData<SyntheticAnalysis>> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut documents = Vec::<DocumentData<SyntheticAnalysis>>::with_capacity(nb_docs);
    for d in 0..nb_docs {
        let doc_id = format!("synth.d{}", d);
        let nb_sentences = rng.gen_range(1..4);
        let mut sentences = Vec::<SentenceData<SyntheticAnalysis>>::with_capacity(nb_sentences);
        for s in 0..nb_sentences {
            let sent_id = format!("{}.s{}", doc_id, s);
            let nb_pairs = rng.gen_range(1..4);
            let pairs = (0..nb_pairs).map(|p| format!("{}.p{}", sent_id, p)).collect();
            let analysis = SyntheticAnalysis{nb_tokens : rng.gen_range(4..9), seed : rng.gen()};
            sentences.push(SentenceData{sent_id, analysis, pairs});
        }
        documents.push(DocumentData{doc_id, sentences});
    }
    documents
} // end of make_documents


fn parse_linear_args(matches : &ArgMatches) -> Result<LinearParams, anyhow::Error> {
    log::debug!("in parse_linear_args");
    // pooling mode. An unsupported mode is a configuration defect, the whole run aborts
    let mode = match matches.value_of("mode") {
        Some(str) => {
            match PoolingMode::from_str(str) {
                Ok(mode) => mode,
                _        => {
                    log::error!("unsupported pooling mode {}, expected sum or max", str);
                    std::process::exit(1);
                },
            }
        },
        _   => PoolingMode::Sum,
    }; // end match

    // get epsil
    let epsil = match matches.value_of("epsil") {
        Some(str) => {
            let res = str.parse::<f64>();
            if res.is_ok() {
                res.unwrap()
            }
            else {
                return Err(anyhow!("error parsing epsil"));
            }
        },
        _   => EPSIL_DEFAULT,
    }; // end match

    let parallel = matches.is_present("parallel");
    //
    let params = LinearParams::new(mode, epsil, parallel);
    return Ok(params);
} // end of parse_linear_args


pub fn main() {
    //
    let _ = env_logger::builder().is_test(true).try_init();
    log::info!("logger initialized");
    //
    let matches = Command::new("linearize")
        .arg(Arg::new("docs")
            .long("docs")
            .takes_value(true)
            .help("number of synthetic documents, default 10"))
        .arg(Arg::new("mode")
            .long("mode")
            .takes_value(true)
            .help("pooling mode, \"sum\" or \"max\", default sum"))
        .arg(Arg::new("epsil")
            .long("epsil")
            .takes_value(true)
            .help("edge significance threshold, default 0.00001"))
        .arg(Arg::new("parallel")
            .short('p')
            .long("parallel")
            .help("-p for parallel linearization"))
        .arg(Arg::new("limit")
            .long("limit")
            .takes_value(true)
            .help("process only the first documents"))
        .arg(Arg::new("seed")
            .long("seed")
            .takes_value(true)
            .help("seed of the synthetic corpus, default 1234"))
        .arg(Arg::new("vocab")
            .long("vocab")
            .takes_value(true)
            .help("dump the vocabulary in bson under this name"))
        .arg(Arg::new("features")
            .long("features")
            .takes_value(true)
            .help("dump the linearized corpus in this sparse feature file"))
    .get_matches();

    // decode args

    let nb_docs = match matches.value_of("docs") {
        Some(str) => {
            match str.parse::<usize>() {
                Ok(val) => val,
                _       => {
                    log::error!("could not parse docs");
                    std::process::exit(1);
                },
            }
        },
        _ => 10,
    };
    let seed = match matches.value_of("seed") {
        Some(str) => {
            match str.parse::<u64>() {
                Ok(val) => val,
                _       => {
                    log::error!("could not parse seed");
                    std::process::exit(1);
                },
            }
        },
        _ => 1234,
    };
    let limit = match matches.value_of("limit") {
        Some(str) => {
            match str.parse::<usize>() {
                Ok(val) => Some(val),
                _       => {
                    log::error!("could not parse limit");
                    std::process::exit(1);
                },
            }
        },
        _ => None,
    };
    let params = match parse_linear_args(&matches) {
        Ok(params) => params,
        Err(e)     => {
            log::error!("error : {:?}", e);
            std::process::exit(1);
        },
    };
    //
    let documents = make_documents(nb_docs, seed);
    let driver = CorpusDriver::new(SyntheticBuilder, WalkKernel::default(), true, limit);
    let corpus : CorpusInstances<f64> = driver.process_documents(&documents);
    println!("processed {} documents, {} pairs", corpus.get_nb_documents(), corpus.get_nb_pairs());
    //
    let vocabulary = corpus.build_vocabulary(params.get_epsil());
    println!("vocabulary : {} features", vocabulary.nb_features());
    //
    let linearized = corpus.linearize(&vocabulary, &params);
    let nb_nonzero : usize = linearized.values().map(|vector| vector.len()).sum();
    println!("linearized {} pairs, mean nonzero features per pair : {:.1}",
        linearized.len(), nb_nonzero as f64 / linearized.len().max(1) as f64);
    //
    if matches.is_present("vocab") {
        let vocab_name = matches.value_of("vocab").unwrap().to_string();
        let output = Output::new(Format::BSON, &Some(vocab_name));
        if let Err(e) = bson_dump(&vocabulary, &output) {
            log::error!("error : {:?}", e);
            log::error!("vocabulary dump failed");
            std::process::exit(1);
        }
    }
    if matches.is_present("features") {
        let feature_file = matches.value_of("features").unwrap().to_string();
        let outputs : Vec<f64> = corpus.get_instances().iter().map(|(_, instance)| instance.get_output()).collect();
        let vectors : Vec<SparseFeatureVector<f64>> = linearized.into_iter().map(|(_, vector)| vector).collect();
        let path = std::path::Path::new(&feature_file);
        if let Err(e) = csv_dump_features(&outputs, &vectors, path) {
            log::error!("error : {:?}", e);
            log::error!("feature dump failed");
            std::process::exit(1);
        }
        println!("features written in {}", feature_file);
    }
    //
}  // end of main
