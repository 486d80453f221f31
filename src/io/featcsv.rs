//! dump of linearized instances as a sparse feature file.
//!
//! One line per instance : the output value first, then rank:value fields with ranks
//! ascending, space separated. This is the classical input format of sparse linear
//! and kernel classifiers, ranks come from the shared vocabulary so lines of different
//! corpora linearized with the same vocabulary are comparable.
//!

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;

use ndarray_linalg::Scalar;
use num_traits::float::Float;

use crate::linear::linearize::SparseFeatureVector;

/// writes one line per (output, vector) couple. outputs and vectors must have the
/// same length and the same order, as produced by corpus linearization.
pub fn csv_dump_features<F>(outputs : &[f64], vectors : &[SparseFeatureVector<F>], filepath : &Path) -> Result<(), anyhow::Error>
    where F : Float + Scalar {
    //
    if outputs.len() != vectors.len() {
        log::error!("csv_dump_features got {} outputs for {} vectors", outputs.len(), vectors.len());
        return Err(anyhow!("csv_dump_features got {} outputs for {} vectors", outputs.len(), vectors.len()));
    }
    let fileres = OpenOptions::new().write(true).create(true).truncate(true).open(filepath);
    if fileres.is_err() {
        log::error!("csv_dump_features : could not open file {:?}", filepath.as_os_str());
        return Err(anyhow!("csv_dump_features could not open file {}", filepath.display()));
    }
    let file = fileres.unwrap();
    let mut wtr = WriterBuilder::new().delimiter(b' ').flexible(true).from_writer(file);
    //
    for (output, vector) in outputs.iter().zip(vectors.iter()) {
        let mut record = Vec::<String>::with_capacity(1 + vector.len());
        record.push(format!("{}", output));
        // ranks ascending, classifiers require sorted indices
        let mut ranks : Vec<&usize> = vector.keys().collect();
        ranks.sort_unstable();
        for rank in ranks {
            record.push(format!("{}:{}", rank, vector[rank]));
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    log::info!("csv_dump_features wrote {} lines in {}", outputs.len(), filepath.display());
    Ok(())
} // end of csv_dump_features

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    #[allow(dead_code)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_feature_file_format() {
        //
        log_init_test();
        //
        let mut vector = SparseFeatureVector::<f64>::new();
        vector.insert(3, 0.25);
        vector.insert(0, 0.5);
        let outputs = vec![1.];
        let path = std::env::temp_dir().join("test_features.txt");
        csv_dump_features(&outputs, &[vector], &path).unwrap();
        //
        let dumped = std::fs::read_to_string(&path).unwrap();
        let first_line = dumped.lines().next().unwrap();
        // ranks must come out ascending
        assert_eq!(first_line, "1 0:0.5 3:0.25");
    } // end of test_feature_file_format

} // end of mod tests
