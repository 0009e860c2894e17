//! Flat named-array bundles (`.npz`) for containers and collections.
//!
//! # Layout
//!
//! ```text
//! single container          collection
//! ----------------          ----------
//! u        [N] | [N, nu]    sdl/0/u, sdl/0/y, sdl/0/cheat_n, ...
//! y        (if present)     sdl/1/u, ...
//! x        (if present)
//! cheat_n  0-d int64
//! normed   0-d bool
//! ```
//!
//! Loading inspects the key names: any `sdl/` key means a collection.
//! 0-d values are unwrapped; a 0-d `u`, `y` or `x` counts as absent.

use crate::error::{DataError, Result};
use crate::sequence::{Signal, SystemData, SystemDataList, WindowableSequence};
use log::{debug, info};
use ndarray::{Array0, ArrayD, Ix0, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

const LIST_PREFIX: &str = "sdl/";

/// What a bundle turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Single(SystemData),
    List(SystemDataList),
}

impl Loaded {
    pub fn into_single(self) -> Option<SystemData> {
        match self {
            Loaded::Single(data) => Some(data),
            Loaded::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<SystemDataList> {
        match self {
            Loaded::Single(_) => None,
            Loaded::List(list) => Some(list),
        }
    }
}

/// Write one container to `path`.
pub fn save_system_data<P: AsRef<Path>>(data: &SystemData, path: P) -> Result<()> {
    let mut npz = NpzWriter::new(File::create(path.as_ref())?);
    write_members(&mut npz, "", data)?;
    npz.finish()?;
    debug!("saved {} samples to {}", data.len(), path.as_ref().display());
    Ok(())
}

/// Write every member of `list` to `path` under `sdl/<i>/` keys.
pub fn save_system_data_list<P: AsRef<Path>>(list: &SystemDataList, path: P) -> Result<()> {
    let mut npz = NpzWriter::new(File::create(path.as_ref())?);
    for (i, member) in list.iter().enumerate() {
        write_members(&mut npz, &format!("{LIST_PREFIX}{i}/"), member)?;
    }
    npz.finish()?;
    debug!(
        "saved {} members to {}",
        list.n_members(),
        path.as_ref().display()
    );
    Ok(())
}

/// Read a bundle written by [`save_system_data`] or [`save_system_data_list`].
///
/// # Errors
///
/// [`DataError::Bundle`] when required keys are missing or collection
/// member indices are not contiguous from 0.
pub fn load_system_data<P: AsRef<Path>>(path: P) -> Result<Loaded> {
    let mut npz = NpzReader::new(File::open(path.as_ref())?)?;
    let names = npz.names()?;

    let loaded = if names.iter().any(|n| n.starts_with(LIST_PREFIX)) {
        let indices = member_indices(&names)?;
        let members = indices
            .into_iter()
            .map(|i| read_members(&mut npz, &names, &format!("{LIST_PREFIX}{i}/")))
            .collect::<Result<Vec<_>>>()?;
        Loaded::List(SystemDataList::new(members)?)
    } else {
        Loaded::Single(read_members(&mut npz, &names, "")?)
    };

    info!(
        "loaded {} from {}",
        match &loaded {
            Loaded::Single(data) => data.to_string(),
            Loaded::List(list) => list.to_string(),
        },
        path.as_ref().display()
    );
    Ok(loaded)
}

fn write_members<W: Write + Seek>(
    npz: &mut NpzWriter<W>,
    prefix: &str,
    data: &SystemData,
) -> Result<()> {
    npz.add_array(format!("{prefix}u"), &data.u().to_dyn())?;
    if let Some(y) = data.y() {
        npz.add_array(format!("{prefix}y"), &y.to_dyn())?;
    }
    if let Some(x) = data.x() {
        npz.add_array(format!("{prefix}x"), &x.to_dyn())?;
    }
    npz.add_array(
        format!("{prefix}cheat_n"),
        &Array0::from_elem((), data.cheat_n() as i64),
    )?;
    npz.add_array(format!("{prefix}normed"), &Array0::from_elem((), data.is_normed()))?;
    Ok(())
}

fn read_members<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    prefix: &str,
) -> Result<SystemData> {
    let key = |field: &str| format!("{prefix}{field}");
    let has = |field: &str| names.contains(&key(field));

    let signal = |npz: &mut NpzReader<R>, field: &'static str| -> Result<Option<Signal>> {
        if !has(field) {
            return Ok(None);
        }
        let array: ArrayD<f64> = npz.by_name::<OwnedRepr<f64>, IxDyn>(&key(field))?;
        // a 0-d entry is a placeholder for an absent sequence
        if array.ndim() == 0 {
            debug!("{} is 0-d, treated as absent", key(field));
            return Ok(None);
        }
        Signal::from_dyn(field, array).map(Some)
    };

    let u = signal(npz, "u")?;
    let y = signal(npz, "y")?;
    let x = signal(npz, "x")?;

    let cheat_n = if has("cheat_n") {
        let value = npz.by_name::<OwnedRepr<i64>, Ix0>(&key("cheat_n"))?.into_scalar();
        usize::try_from(value)
            .map_err(|_| DataError::Bundle(format!("{} is negative: {value}", key("cheat_n"))))?
    } else {
        0
    };
    let normed = if has("normed") {
        npz.by_name::<OwnedRepr<bool>, Ix0>(&key("normed"))?.into_scalar()
    } else {
        false
    };

    if u.is_none() && y.is_none() {
        return Err(DataError::Bundle(format!(
            "no u or y array found under prefix '{prefix}'"
        )));
    }
    SystemData::new(u, y, x, cheat_n, normed)
}

/// Member indices named by `sdl/<i>/...` keys, checked to be `0..n`.
fn member_indices(names: &[String]) -> Result<Vec<usize>> {
    let mut indices = BTreeSet::new();
    for name in names.iter().filter_map(|n| n.strip_prefix(LIST_PREFIX)) {
        let index = name
            .split('/')
            .next()
            .and_then(|i| i.parse::<usize>().ok())
            .ok_or_else(|| DataError::Bundle(format!("malformed collection key '{name}'")))?;
        indices.insert(index);
    }

    let indices: Vec<usize> = indices.into_iter().collect();
    if indices.iter().enumerate().any(|(pos, &i)| pos != i) {
        return Err(DataError::Bundle(format!(
            "collection member indices are not contiguous: {indices:?}"
        )));
    }
    Ok(indices)
}
