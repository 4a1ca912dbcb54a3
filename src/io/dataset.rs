use crate::error::{GenError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One training pair: an image source plus its textual description.
///
/// The description is accepted end to end but consumed by no computation
/// yet; it reserves a slot for a future conditioning mechanism.
pub struct TrainingExample {
    pub path: PathBuf,
    pub description: String,
}

/// An ordered set of training examples.
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
}

impl TrainingSet {
    /// Pairs image paths with descriptions by index. The lengths are not
    /// required to match: extra descriptions are ignored and missing ones
    /// become empty strings, with a warning either way.
    pub fn from_pairs(paths: &[PathBuf], descriptions: &[String]) -> Self {
        if paths.len() != descriptions.len() {
            log::warn!(
                "{} image paths but {} descriptions; pairing by index",
                paths.len(),
                descriptions.len()
            );
        }
        let examples = paths
            .iter()
            .enumerate()
            .map(|(i, p)| TrainingExample {
                path: p.clone(),
                description: descriptions.get(i).cloned().unwrap_or_default(),
            })
            .collect();
        TrainingSet { examples }
    }

    /// Reads a manifest where each non-empty line is
    /// `<image_path>\t<description>`. Malformed lines and missing image
    /// files are errors; an empty manifest is an error.
    pub fn from_manifest<P: AsRef<Path>>(manifest_path: P) -> Result<Self> {
        let p = manifest_path.as_ref();
        let f = File::open(p).map_err(|e| {
            GenError::Dataset(format!("failed to open manifest {}: {}", p.display(), e))
        })?;
        let reader = BufReader::new(f);
        let mut examples = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let l = line.map_err(|e| {
                GenError::Dataset(format!(
                    "failed to read manifest {} line {}: {}",
                    p.display(),
                    i + 1,
                    e
                ))
            })?;
            let l = l.trim();
            if l.is_empty() {
                continue;
            }
            let parts: Vec<&str> = l.splitn(2, '\t').collect();
            if parts.len() != 2 {
                return Err(GenError::Dataset(format!(
                    "invalid manifest line {}: '{}'. Expected '<image_path>\t<description>'",
                    i + 1,
                    l
                )));
            }
            let img_path = PathBuf::from(parts[0]);
            if !img_path.exists() {
                return Err(GenError::Dataset(format!(
                    "image file not found for manifest line {}: {}",
                    i + 1,
                    img_path.display()
                )));
            }
            examples.push(TrainingExample {
                path: img_path,
                description: parts[1].to_string(),
            });
        }
        if examples.is_empty() {
            return Err(GenError::Dataset(format!(
                "no entries found in manifest {}",
                p.display()
            )));
        }
        log::info!(
            "training set loaded: manifest={} entries={}",
            p.display(),
            examples.len()
        );
        Ok(TrainingSet { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingExample> {
        self.examples.iter()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }
}
