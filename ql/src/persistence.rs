use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::learn::q_table::QTable;
use crate::prelude::{ModelActionType, QlError};

const FORMAT_VERSION: u32 = 1;

/// On-disk representation of a [QTable]
#[derive(Serialize, Deserialize)]
struct QTableRecord {
    format_version: u32,
    state_shape: Vec<usize>,
    num_actions: usize,
    values: Vec<f32>,
}

/// Origin of a value table returned by [load_or_init]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loaded {
    Restored,
    /// Nothing usable found; the table is zero-initialized
    Fresh,
}

pub fn save_q_table(
    table: &QTable,
    path: &Path,
) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    }
    let record = QTableRecord {
        format_version: FORMAT_VERSION,
        state_shape: table.state_shape().to_vec(),
        num_actions: table.num_actions(),
        values: table.values().to_vec(),
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &record).with_context(|| format!("writing value table to {}", path.display()))?;
    writer.flush()?;
    log::info!("saved value table {:?}x{} to {}", record.state_shape, record.num_actions, path.display());
    Ok(())
}

pub fn load_q_table(path: &Path) -> Result<QTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let record: QTableRecord =
        bincode::deserialize_from(BufReader::new(file)).with_context(|| format!("reading value table from {}", path.display()))?;
    if record.format_version != FORMAT_VERSION {
        return Err(QlError(format!(
            "{}: unsupported value table format version {}",
            path.display(),
            record.format_version
        )))?;
    }
    QTable::from_parts(record.state_shape, record.num_actions, record.values)
        .with_context(|| format!("inconsistent value table in {}", path.display()))
}

/// Loads the value table at `path` or falls back to a zero-initialized one.
///
/// A missing or unreadable file is recovered (with a warning); a readable table with a
/// different shape than `state_shape`x`num_actions` is an error.
pub fn load_or_init(
    path: &Path,
    state_shape: &[usize],
    num_actions: ModelActionType,
) -> Result<(QTable, Loaded)> {
    match load_q_table(path) {
        Ok(table) => {
            table.ensure_shape(state_shape, num_actions)?;
            log::info!("loaded value table from {}", path.display());
            Ok((table, Loaded::Restored))
        }
        Err(e) => {
            log::warn!("could not load value table ({:#}); starting with a fresh one", e);
            Ok((QTable::new(state_shape, num_actions)?, Loaded::Fresh))
        }
    }
}
