//! Opens input files, transparently decompressing `.gz` paths.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::DatasetError;

/// Opens `path` for reading. Paths ending in `.gz` are read through a gzip
/// decoder.
///
/// # Errors
///
/// Returns [`DatasetError::Open`] if the file cannot be opened.
pub fn open(path: &Path) -> Result<Box<dyn Read>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    if is_gzipped(path) {
        log::debug!("Reading {} through gzip decoder", path.display());
        Ok(Box::new(flate2::read::GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
