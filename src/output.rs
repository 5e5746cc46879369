//! Data file writer and reader.
//!
//! Every file starts with the 4-byte magic `ETX1` followed by a bincode
//! payload. Files named `*.gz` are gzip-compressed as a whole with a zeroed
//! header mtime, so unchanged input always produces the same bytes.

use crate::constants::MANIFEST_FILE;
use crate::error::{ExtractError, Result};
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const MAGIC: &[u8; 4] = b"ETX1";

/// One written file, as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub dataset: String,
    pub file: String,
    pub rows: usize,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<WrittenFile>,
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut payload = MAGIC.to_vec();
    bincode::serialize_into(&mut payload, value)?;
    Ok(payload)
}

fn gzip(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

/// Writes datasets into one output directory and keeps track of what it wrote.
pub struct DatasetWriter {
    root: PathBuf,
    written: Vec<WrittenFile>,
}

impl DatasetWriter {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            written: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serializes `value` to `file` and records it under `dataset`.
    pub fn write<T: Serialize + ?Sized>(
        &mut self,
        dataset: &str,
        file: &str,
        rows: usize,
        value: &T,
    ) -> Result<&WrittenFile> {
        let path = self.root.join(file);
        let payload = encode(value)?;
        let bytes = if is_gzip(&path) { gzip(&payload)? } else { payload };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &bytes)?;

        let digest = hex::encode(Sha256::digest(&bytes));
        info!(dataset, file = %path.display(), rows, bytes = bytes.len(), "Wrote dataset");

        self.written.push(WrittenFile {
            dataset: dataset.to_string(),
            file: file.to_string(),
            rows,
            bytes: bytes.len() as u64,
            sha256: digest,
        });
        let last = self.written.len() - 1;
        Ok(&self.written[last])
    }

    /// Writes `manifest.json` listing every dataset written so far, sorted by
    /// dataset name.
    pub fn finish(self) -> Result<Manifest> {
        let mut files = self.written;
        files.sort_by(|a, b| a.dataset.cmp(&b.dataset));
        let manifest = Manifest { files };

        let path = self.root.join(MANIFEST_FILE);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &manifest)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(file = %path.display(), datasets = manifest.files.len(), "Wrote manifest");
        Ok(manifest)
    }
}

/// Reads back a file written by [`DatasetWriter::write`].
pub fn read_dataset<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    let mut reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(ExtractError::Format(format!(
            "{}: expected header {:?}, found {:?}",
            path.display(),
            MAGIC,
            magic
        )));
    }

    Ok(bincode::deserialize_from(reader)?)
}

pub fn read_manifest(root: impl AsRef<Path>) -> Result<Manifest> {
    let content = fs::read_to_string(root.as_ref().join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&content)?)
}
