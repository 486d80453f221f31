//! module to do bson io for a built vocabulary
//!
//!  Data are formatted in a bson Document, each value has a key.
//!
//!  The encoding is done in 2 parts:
//! 1. A header structure with key "header". The structure is described below see
//!    struct [VocabularyBsonHeader]
//! - a version index
//! - the number of features (also the next rank counter)
//! - the number of chunk documents following
//!
//! 2. The feature map, split in chunk documents. Each chunk maps label pair keys to
//!    their rank encoded as i64, keys inserted in rank order. A reload therefore
//!    rebuilds exactly the same ranks, which is the whole point : a vocabulary built
//!    on training data keeps its feature ranks at inference time.
//!

// Note : a Bson document must not be larger than 16Mb!
// So the feature map is chunked over many Documents in the file dumped

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// for serialization, deserialization
use bson::{bson, Bson, Document};
use serde::{Deserialize, Serialize};

use num::cast::FromPrimitive;

use crate::io::output::Output;
use crate::linear::vocabulary::FeatureVocabulary;

/// number of vocabulary entries in one bson chunk document
const CHUNK_SIZE : usize = 100_000;

/// This structure defines the header of the bson document
#[derive(Debug, Serialize, Deserialize)]
pub struct VocabularyBsonHeader {
    /// version of dump format
    pub version : i64,
    /// number of label pair keys dumped
    pub nb_features : i64,
    /// number of chunk documents following the header
    pub nb_chunks : i64,
} // end of VocabularyBsonHeader


/// dump a vocabulary in bson format in the file described by output.
pub fn bson_dump(vocabulary : &FeatureVocabulary, output : &Output) -> Result<(), anyhow::Error> {
    //
    log::info!("entering vocabulary bson_dump");
    //
    let path = Path::new(output.get_output_name());
    let fileres = OpenOptions::new().write(true).create(true).truncate(true).open(path);
    let file = if fileres.is_ok() {
        fileres.unwrap()
    } else {
        return Err(anyhow!("could not open file : {}", path.display()));
    };
    let mut bufwriter = BufWriter::new(file);
    //
    let nb_features : i64 = FromPrimitive::from_usize(vocabulary.nb_features()).unwrap();
    let nb_chunks : i64 = FromPrimitive::from_usize((vocabulary.nb_features() + CHUNK_SIZE - 1) / CHUNK_SIZE).unwrap();
    let mut doc = Document::new();
    let bson_header = bson!({
        "version": 1_i64,
        "nb_features": nb_features,
        "nb_chunks": nb_chunks
        }
    );
    doc.insert("header", bson_header);
    let res = doc.to_writer(&mut bufwriter);
    if res.is_err() {
        log::error!("vocabulary bson dump could not write header in {}", path.display());
        return Err(anyhow!("dump of bson failed: {}", res.err().unwrap()));
    }
    // now loop on the feature map, keys go out in rank order
    let mut chunk = Document::new();
    let mut in_chunk = 0usize;
    for (key, rank) in vocabulary.iter() {
        let rank_i : i64 = FromPrimitive::from_usize(*rank).unwrap();
        chunk.insert(key.clone(), Bson::Int64(rank_i));
        in_chunk += 1;
        if in_chunk == CHUNK_SIZE {
            let res = chunk.to_writer(&mut bufwriter);
            if res.is_err() {
                log::error!("vocabulary bson dump error at rank {}", rank);
                return Err(anyhow!("dump of bson failed: {}", res.err().unwrap()));
            }
            chunk = Document::new();
            in_chunk = 0;
        }
    }
    if in_chunk > 0 {
        let res = chunk.to_writer(&mut bufwriter);
        if res.is_err() {
            log::error!("vocabulary bson dump error in last chunk");
            return Err(anyhow!("dump of bson failed: {}", res.err().unwrap()));
        }
    }
    //
    log::info!("vocabulary bson dump in file {} finished, {} features", path.display(), nb_features);
    Ok(())
} // end of bson_dump


/// reload a vocabulary dumped by [bson_dump].
/// The reloaded mapping is checked for rank order so that a corrupt or hand edited
/// file cannot silently shuffle feature ranks.
pub fn bson_load(fname : &str) -> Result<FeatureVocabulary, anyhow::Error> {
    //
    log::info!("entering vocabulary bson_load from {}", fname);
    //
    let path = Path::new(fname);
    let fileres = OpenOptions::new().read(true).open(path);
    let file = if fileres.is_ok() {
        fileres.unwrap()
    } else {
        return Err(anyhow!("could not open file : {}", path.display()));
    };
    let mut bufreader = BufReader::new(file);
    let res = Document::from_reader(&mut bufreader);
    if res.is_err() {
        log::error!("vocabulary bson reload of header failed : {:?}", res.as_ref().err());
        return Err(anyhow!("reload of bson header failed: {}", res.err().unwrap()));
    }
    let doc = res.unwrap();
    let header_bson = match doc.get("header") {
        Some(header_bson) => header_bson,
        None              => {
            return Err(anyhow!("no header key in bson file {}", path.display()));
        },
    };
    let header : VocabularyBsonHeader = bson::from_bson(header_bson.clone())?;
    log::debug!("vocabulary bson header : {:?}", header);
    if header.version != 1 {
        return Err(anyhow!("unknown vocabulary bson version : {}", header.version));
    }
    //
    let mut vocabulary = FeatureVocabulary::new();
    for _ in 0..header.nb_chunks {
        let res = Document::from_reader(&mut bufreader);
        if res.is_err() {
            log::error!("vocabulary bson reload of chunk failed : {:?}", res.as_ref().err());
            return Err(anyhow!("reload of bson chunk failed: {}", res.err().unwrap()));
        }
        let chunk = res.unwrap();
        for (key, value) in chunk.iter() {
            let rank = match value.as_i64() {
                Some(rank) => rank,
                None       => {
                    return Err(anyhow!("key {} has a non integer rank", key));
                },
            };
            if vocabulary.get_rank(key).is_some() {
                return Err(anyhow!("duplicated key {} in vocabulary bson file", key));
            }
            let assigned = vocabulary.insert_key(key.clone());
            if Some(rank) != FromPrimitive::from_usize(assigned) {
                log::error!("vocabulary bson file not in rank order, key {} dumped {} reassigned {}", key, rank, assigned);
                return Err(anyhow!("vocabulary bson file not in rank order at key {}", key));
            }
        }
    }
    if vocabulary.nb_features() != header.nb_features as usize {
        return Err(anyhow!("vocabulary bson file announced {} features, got {}", header.nb_features, vocabulary.nb_features()));
    }
    log::info!("vocabulary bson reload finished, {} features", vocabulary.nb_features());
    Ok(vocabulary)
} // end of bson_load

//===============================================================

// end of mod tests
