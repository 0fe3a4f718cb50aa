//! On-disk storage of fitted models and product metadata
//!
//! Layout of an artifact directory:
//!
//! ```text
//! models/
//!   meta.json                  product -> { past_avg, last_ds }
//!   <artifact stem>.model.json
//! ```
//!
//! Each artifact file carries the real product name next to the model, so
//! the filename encoding never has to be reversed. A stem that had to be
//! sanitized gets a short hash of the real name, so `a/b` and `a_b` never
//! share a file.
//!
//! Loading never fails hard: a missing directory, an unreadable `meta.json`
//! or a corrupt artifact degrade the result instead. Training and serving
//! must not use the same directory at the same time; there is no locking.
//! A training run removes artifacts of products it did not persist, so the
//! directory always matches the last run's `meta.json`.

use crate::data::Series;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the metadata document
pub const META_FILE: &str = "meta.json";

/// Suffix of every model artifact
pub const ARTIFACT_SUFFIX: &str = ".model.json";

/// Longest file stem derived from a product name, in characters
pub const MAX_FILE_STEM: usize = 200;

/// Hex digits of the name hash appended to a sanitized stem
const STEM_HASH_LEN: usize = 8;

/// Baseline assumed for a product whose metadata had to be regenerated
pub const DEGRADED_BASELINE: f64 = 100.0;

/// Per-product metadata needed at inference time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMeta {
    /// Mean of all historical values
    pub past_avg: f64,
    /// Last observed date
    #[serde(default)]
    pub last_ds: Option<NaiveDate>,
    /// Set when the record was regenerated without training output
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl ProductMeta {
    /// Metadata of a training series, `None` for an empty series
    pub fn from_series(series: &Series) -> Option<Self> {
        let last_ds = series.last_date()?;
        Some(Self {
            past_avg: series.mean(),
            last_ds: Some(last_ds),
            degraded: false,
        })
    }

    /// Placeholder used when an artifact has no metadata
    ///
    /// Growth rates computed against it are not meaningful.
    pub fn degraded() -> Self {
        Self {
            past_avg: DEGRADED_BASELINE,
            last_ds: None,
            degraded: true,
        }
    }
}

#[derive(Serialize)]
struct ArtifactRef<'a, H> {
    product: &'a str,
    model: &'a H,
}

#[derive(Deserialize)]
struct ArtifactFile<H> {
    product: String,
    model: H,
}

/// Everything read back from an artifact directory
#[derive(Debug, Clone)]
pub struct LoadedArtifacts<H> {
    /// Fitted model per product
    pub models: BTreeMap<String, H>,
    /// Metadata per product, including regenerated records
    pub meta: BTreeMap<String, ProductMeta>,
}

/// Outcome of loading an artifact directory
#[derive(Debug, Clone)]
pub enum StoreState<H> {
    /// At least one model was loaded
    Loaded(LoadedArtifacts<H>),
    /// Nothing usable on disk
    Unavailable,
}

impl<H> StoreState<H> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, StoreState::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&LoadedArtifacts<H>> {
        match self {
            StoreState::Loaded(artifacts) => Some(artifacts),
            StoreState::Unavailable => None,
        }
    }
}

/// Filesystem-safe file stem for a product name
///
/// Path separators, reserved characters and control characters become `_`,
/// and the result is cut to [`MAX_FILE_STEM`] characters.
pub fn safe_file_name(product: &str) -> String {
    product
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_FILE_STEM)
        .collect()
}

/// File stem of a product's artifact
///
/// Names that are already safe are used as they are. Otherwise the
/// sanitized name is followed by `-` and the first [`STEM_HASH_LEN`] hex
/// digits of the SHA-256 of the real name.
pub fn artifact_stem(product: &str) -> String {
    let safe = safe_file_name(product);
    if safe == product {
        return safe;
    }
    let digest = hex::encode(Sha256::digest(product.as_bytes()));
    format!("{safe}-{}", &digest[..STEM_HASH_LEN])
}

/// Write `value` as pretty JSON, creating parent directories
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Artifact directory handle
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a product's model artifact
    pub fn artifact_path(&self, product: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", artifact_stem(product), ARTIFACT_SUFFIX))
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    /// Persist the fitted model of one product
    pub fn save_model<H: Serialize>(&self, product: &str, model: &H) -> Result<PathBuf> {
        let path = self.artifact_path(product);
        write_json_pretty(&path, &ArtifactRef { product, model })?;
        debug!(product, path = %path.display(), "Saved model artifact");
        Ok(path)
    }

    /// Replace the metadata document
    pub fn save_meta(&self, meta: &BTreeMap<String, ProductMeta>) -> Result<()> {
        write_json_pretty(&self.meta_path(), meta)?;
        info!(products = meta.len(), path = %self.meta_path().display(), "Saved metadata");
        Ok(())
    }

    /// Delete every artifact that does not belong to one of `keep`
    ///
    /// Returns the number of files removed.
    pub fn prune<'a>(&self, keep: impl IntoIterator<Item = &'a String>) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let keep: BTreeSet<PathBuf> = keep.into_iter().map(|p| self.artifact_path(p)).collect();
        let mut removed = 0;
        for path in self.artifact_files()? {
            if !keep.contains(&path) {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "Removed stale model artifact");
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, dir = %self.dir.display(), "Pruned stale model artifacts");
        }
        Ok(removed)
    }

    /// Read one artifact, returning the product name stored in it
    pub fn read_artifact<H: DeserializeOwned>(path: &Path) -> Result<(String, H)> {
        let file = File::open(path)?;
        let artifact: ArtifactFile<H> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ForecastError::ArtifactCorruption {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok((artifact.product, artifact.model))
    }

    /// Read the metadata document
    pub fn read_meta(&self) -> Result<BTreeMap<String, ProductMeta>> {
        let file = File::open(self.meta_path())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn artifact_files(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_artifact = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ARTIFACT_SUFFIX));
            if is_artifact && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Load every readable model and the metadata that goes with it
    ///
    /// - directory absent: `Unavailable`
    /// - `meta.json` missing or unreadable: metadata is regenerated
    /// - corrupt artifact: that product is skipped
    /// - artifact without metadata: a degraded placeholder record is added
    pub fn load<H: DeserializeOwned>(&self) -> StoreState<H> {
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "Models directory does not exist");
            return StoreState::Unavailable;
        }

        let mut meta = if self.meta_path().exists() {
            self.read_meta().unwrap_or_else(|e| {
                warn!(path = %self.meta_path().display(), "Failed to load metadata, will regenerate: {e}");
                BTreeMap::new()
            })
        } else {
            debug!(dir = %self.dir.display(), "No metadata document, will regenerate");
            BTreeMap::new()
        };

        let paths = match self.artifact_files() {
            Ok(paths) => paths,
            Err(e) => {
                warn!(dir = %self.dir.display(), "Failed to list models directory: {e}");
                return StoreState::Unavailable;
            }
        };

        let mut models = BTreeMap::new();
        for path in paths {
            match Self::read_artifact::<H>(&path) {
                Ok((product, model)) => {
                    if !meta.contains_key(&product) {
                        warn!(product = %product, "No metadata for model; using degraded baseline {DEGRADED_BASELINE}");
                        meta.insert(product.clone(), ProductMeta::degraded());
                    }
                    models.insert(product, model);
                }
                Err(e) => warn!(path = %path.display(), "Failed to load model: {e}"),
            }
        }

        if models.is_empty() {
            warn!(dir = %self.dir.display(), "No models could be loaded");
            return StoreState::Unavailable;
        }

        info!(models = models.len(), dir = %self.dir.display(), "Loaded model artifacts");
        StoreState::Loaded(LoadedArtifacts { models, meta })
    }
}
