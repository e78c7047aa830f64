// File - Whole-file state load and atomic state store
use super::stream::{decode_legacy, decode_migrated, encode_migrated};
use super::{CodecError, ReadPolicy, StateLayout, LEGACY_STATE_LEN};
use crate::state::QearnState;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const IO_BUFFER_SIZE: usize = 1 << 20;

/// Load a state file.
///
/// A blob of exactly the migrated size is decoded with its statistics;
/// anything else is decoded as the legacy layout and any bytes after it are
/// ignored. The file handle is released before returning.
pub fn read_state_file(
    path: &Path,
    policy: ReadPolicy,
) -> Result<(QearnState, StateLayout), CodecError> {
    let open_err = |source| CodecError::OpenRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(open_err)?;
    let len = file.metadata().map_err(open_err)?.len();
    let layout = StateLayout::detect(len);

    info!("📂 Reading state {} ({} bytes, layout {})", path.display(), len, layout);

    if layout == StateLayout::Unknown && len > LEGACY_STATE_LEN {
        warn!(
            "{} trailing bytes after the legacy layout will be ignored",
            len - LEGACY_STATE_LEN
        );
    }

    let reader = BufReader::with_capacity(IO_BUFFER_SIZE, file);
    let state = match layout {
        StateLayout::Migrated => decode_migrated(reader, len, policy)?,
        StateLayout::Legacy | StateLayout::Unknown => decode_legacy(reader, len, policy)?,
    };

    debug!(
        "Decoded state: early_unlocked_cnt={}, fully_unlocked_cnt={}",
        state.early_unlocked_cnt, state.fully_unlocked_cnt
    );
    Ok((state, layout))
}

/// Write the migrated layout to `path`.
///
/// The blob goes to a temporary file next to `path` (next to the file it
/// points to when `path` is a symlink) which then replaces it,
/// so a failed write never leaves a half-written state behind and `path`
/// may be the file the state was read from. Returns the bytes written.
pub fn write_state_file(path: &Path, state: &QearnState) -> Result<u64, CodecError> {
    // A symlink is written through, the link itself stays in place
    let target = match fs::canonicalize(path) {
        Ok(resolved) => {
            if resolved != path {
                debug!("{} resolves to {}", path.display(), resolved.display());
            }
            resolved
        }
        Err(_) => path.to_path_buf(),
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|source| CodecError::OpenWrite {
        path: path.to_path_buf(),
        source,
    })?;

    // Keep the permissions of the file being replaced
    if let Ok(existing) = fs::metadata(&target) {
        if let Err(e) = temp.as_file().set_permissions(existing.permissions()) {
            warn!("Could not copy permissions of {}: {}", path.display(), e);
        }
    }

    let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, temp);
    let written = encode_migrated(state, &mut writer)?;

    let flush_err = |source| CodecError::Flush {
        path: path.to_path_buf(),
        source,
    };
    let temp = writer.into_inner().map_err(|e| flush_err(e.into_error()))?;
    temp.as_file().sync_all().map_err(flush_err)?;

    temp.persist(&target).map_err(|e| CodecError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    info!("💾 Wrote state {} ({} bytes)", path.display(), written);
    Ok(written)
}
