//! File inputs shared by the subcommands.

use std::io::{BufReader, Read};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

use crate::CliError;

/// Open `path` for buffered reading.
pub(crate) fn open_input(
    path: &Utf8Path,
    field: &'static str,
) -> Result<BufReader<fs_utf8::File>, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenInput {
            field,
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(BufReader::new(file))
}

/// Read `path` into a string.
pub(crate) fn read_text(path: &Utf8Path, field: &'static str) -> Result<String, CliError> {
    let mut reader = open_input(path, field)?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| CliError::ReadInput {
            field,
            path: path.to_path_buf(),
            source,
        })?;
    Ok(text)
}
