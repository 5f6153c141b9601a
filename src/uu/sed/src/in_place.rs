// Support for in-place editing
//
// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Diomidis Spinellis
//
// This file is part of the uutils sed package.
// It is licensed under the MIT License.
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

use crate::command::ProcessingContext;
use crate::error_handling::ERROR_EXIT_CODE;
use crate::multi_io::is_stdin;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tempfile::NamedTempFile;
use tracing::debug;
use uucore::display::Quotable;
use uucore::error::{FromIo, UIoError, UResult, USimpleError};

/// Return the name under which the original of file is kept.
/// Every `*` in suffix stands for the file's base name; a suffix
/// without one is appended. A resulting name containing `/` is a path
/// of its own rather than a name in the file's directory.
pub fn backup_path(file: &Path, suffix: &str) -> PathBuf {
    let base = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if suffix.contains('*') {
        suffix.replace('*', &base)
    } else {
        format!("{base}{suffix}")
    };
    if name.contains('/') {
        PathBuf::from(name)
    } else {
        file.with_file_name(name)
    }
}

/// State of the in-place editing of one file at a time
pub struct InPlace {
    suffix: Option<String>,
    follow_symlinks: bool,
    temp_file: Option<NamedTempFile>,
    original_path: Option<PathBuf>,
}

impl InPlace {
    pub fn new(context: &ProcessingContext) -> Self {
        Self {
            suffix: context.in_place_suffix.clone().filter(|s| !s.is_empty()),
            follow_symlinks: context.follow_symlinks,
            temp_file: None,
            original_path: None,
        }
    }

    /// Return the file receiving the edits of the specified file.
    /// The file may be a symbolic link, which is followed or replaced
    /// according to the context.
    pub fn begin(&mut self, file_name: &Path) -> UResult<File> {
        if is_stdin(file_name) {
            return Err(USimpleError::new(
                ERROR_EXIT_CODE,
                "couldn't edit -: not a regular file",
            ));
        }

        let resolved = if self.follow_symlinks {
            fs::canonicalize(file_name)
                .map_err_context(|| format!("couldn't follow symlink {}", file_name.quote()))?
        } else {
            file_name.to_path_buf()
        };

        let metadata = fs::metadata(&resolved)
            .map_err_context(|| format!("can't read {}", resolved.quote()))?;
        if !metadata.is_file() {
            return Err(USimpleError::new(
                ERROR_EXIT_CODE,
                format!("couldn't edit {}: not a regular file", resolved.quote()),
            ));
        }

        let dir = match resolved.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp_file = NamedTempFile::new_in(dir)
            .map_err_context(|| format!("couldn't open temporary file in {}", dir.quote()))?;

        #[cfg(unix)]
        {
            let mode = metadata.permissions().mode() & 0o7777;
            fs::set_permissions(temp_file.path(), fs::Permissions::from_mode(mode))
                .map_err_context(|| format!("couldn't set mode of {}", temp_file.path().quote()))?;
        }

        let output = temp_file
            .reopen()
            .map_err_context(|| format!("couldn't open {}", temp_file.path().quote()))?;
        debug!(file = %resolved.display(), temp = %temp_file.path().display(), "editing in place");
        self.temp_file = Some(temp_file);
        self.original_path = Some(resolved);
        Ok(output)
    }

    /// Replace the file being edited with its edited version, keeping
    /// a backup if a suffix was given. The file returned by begin must
    /// have been flushed.
    pub fn end(&mut self) -> UResult<()> {
        let (Some(orig), Some(temp)) = (self.original_path.take(), self.temp_file.take()) else {
            return Ok(());
        };

        if let Some(suffix) = &self.suffix {
            let backup = backup_path(&orig, suffix);

            #[cfg(windows)]
            // Try to remove to ensure the rename won't fail on Windows.
            let _ = fs::remove_file(&backup);

            fs::rename(&orig, &backup).map_err_context(|| {
                format!("couldn't back up {} to {}", orig.quote(), backup.quote())
            })?;
        } else {
            #[cfg(windows)]
            // On Windows delete the original file for temp.persist to work
            if orig.exists() {
                fs::remove_file(&orig)
                    .map_err_context(|| format!("couldn't remove {}", orig.quote()))?;
            }
        }

        if let Err(e) = temp.persist(&orig) {
            return Err(UIoError::new(
                e.error.kind(),
                format!(
                    "couldn't rename {} to {}",
                    e.file.path().quote(),
                    orig.quote()
                ),
            ));
        }

        Ok(())
    }
}
