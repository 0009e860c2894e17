//! Data Export Module
//!
//! Persist containers and window tensors for training in Python/PyTorch.
//!
//! # Modules
//!
//! - **bundle**: one `.npz` file per container or collection (round-trips)
//! - Core exports: one `.npy` file per window tensor plus JSON metadata
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::export::NumpyExporter;
//!
//! let windows = train.to_windows(&config.window)?;
//! let exporter = NumpyExporter::new(output_dir);
//! let metadata = exporter.export("train", &windows, &config.window)?;
//! ```

pub mod bundle;

use crate::config::WindowConfig;
use crate::error::{DataError, Result};
use crate::preprocessing::SystemDataNorm;
use crate::sequence::{WindowFormat, WindowedData};
use log::info;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub use bundle::{load_system_data, save_system_data, save_system_data_list, Loaded};

/// Metadata about one exported set of window tensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Prefix shared by every file of this export
    pub name: String,

    /// Window format the tensors were built with
    pub format: WindowFormat,

    /// Number of windows (leading dimension of every tensor)
    pub n_windows: usize,

    /// Output history length
    pub na: usize,

    /// Input history length
    pub nb: usize,

    /// Future horizon
    pub nf: usize,

    /// Shape of every written tensor, by tensor name
    pub shapes: BTreeMap<String, Vec<usize>>,

    /// Export timestamp
    pub export_timestamp: String,
}

/// NumPy exporter - writes window tensors to .npy files
pub struct NumpyExporter {
    output_dir: PathBuf,
}

impl NumpyExporter {
    /// Create new NumPy exporter
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export window tensors to NumPy format
    ///
    /// Creates, for the `Io` format:
    /// - `{name}_hist.npy`: \[N_windows, nb*nu + na*ny\]
    /// - `{name}_y.npy`: \[N_windows\] or \[N_windows, ny\]
    /// - `{name}_metadata.json`
    ///
    /// and the matching `uhist`/`yhist`/`ufuture`/`yfuture` files for the
    /// other formats.
    pub fn export(
        &self,
        name: &str,
        windows: &WindowedData,
        config: &WindowConfig,
    ) -> Result<ExportMetadata> {
        if windows.format() != config.format {
            return Err(DataError::InvalidConfig(format!(
                "windows are {} but the config asks for {}",
                windows.format(),
                config.format
            )));
        }

        fs::create_dir_all(&self.output_dir)?;

        let mut shapes = BTreeMap::new();
        for (tensor, array) in windows.tensors() {
            let path = self.output_dir.join(format!("{name}_{tensor}.npy"));
            let writer = BufWriter::new(File::create(&path)?);
            array.write_npy(writer)?;
            info!("Exported {}: {:?}", path.display(), array.shape());
            shapes.insert(tensor.to_string(), array.shape().to_vec());
        }

        let metadata = ExportMetadata {
            name: name.to_string(),
            format: windows.format(),
            n_windows: windows.n_windows(),
            na: config.na,
            nb: config.nb,
            nf: config.nf,
            shapes,
            export_timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.export_metadata(&metadata)?;
        Ok(metadata)
    }

    /// Write normalizer statistics next to the tensors as `{name}_norm.json`.
    pub fn export_normalizer(&self, name: &str, norm: &SystemDataNorm) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{name}_norm.json"));
        norm.save_json(&path)?;
        info!("Exported normalizer: {}", path.display());
        Ok(path)
    }

    fn export_metadata(&self, metadata: &ExportMetadata) -> Result<()> {
        let path = self
            .output_dir
            .join(format!("{}_metadata.json", metadata.name));
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, metadata)?;
        info!("Exported metadata: {}", path.display());
        Ok(())
    }
}

/// Convenience function for direct export
pub fn export_to_numpy<P: AsRef<Path>>(
    output_dir: P,
    name: &str,
    windows: &WindowedData,
    config: &WindowConfig,
) -> Result<ExportMetadata> {
    NumpyExporter::new(output_dir).export(name, windows, config)
}
