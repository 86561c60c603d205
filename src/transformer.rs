use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::{debug, info};
use std::ffi::OsString;
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::TransformError;
use crate::record::Record;

/// Lines cut from the end of the input before anything is transformed.
pub const TRAILING_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub lines_read: usize,
    pub lines_dropped: usize,
    pub records_written: usize,
}

/// Reads `input` in full, drops its last [`TRAILING_LINES`] lines, appends the
/// derived column to every remaining line and replaces `output` with the result.
///
/// `input` and `output` may be the same path: the whole input is in memory
/// before the output is touched. The output is written to a sibling temp file
/// and renamed into place, so on any error the previous `output` survives.
pub fn transform<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Summary, TransformError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let text = fs::read_to_string(input).map_err(|source| TransformError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let lines = split_lines(&text);
    let (selected, dropped) = select(&lines);
    for line in dropped {
        debug!("dropping trailing line {:?}", line);
    }

    let records = parse_records(selected)?;
    replace_file(output, &records)?;

    let summary = Summary {
        lines_read: lines.len(),
        lines_dropped: dropped.len(),
        records_written: records.len(),
    };
    info!(
        "{}: read {} lines, dropped {}, wrote {} records to {}",
        input.display(),
        summary.lines_read,
        summary.lines_dropped,
        summary.records_written,
        output.display()
    );
    Ok(summary)
}

/// Writes each record as `t0,t1,t2,t3,derived\n`, verbatim and unquoted.
pub fn write_records<T: io::Write>(records: &[Record], target: T) -> Result<(), TransformError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(target);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Splits text into lines the way a text-mode reader with universal newlines
/// does: `\r\n`, `\r` and `\n` all end a line and are stripped. A final line
/// without a terminator still counts.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split_inclusive('\n')
        .map(|line| line.strip_suffix('\n').unwrap_or(line).to_string())
        .collect()
}

/// Splits off the last [`TRAILING_LINES`] lines. Fewer lines than that leaves
/// nothing selected.
fn select(lines: &[String]) -> (&[String], &[String]) {
    let keep = lines.len().saturating_sub(TRAILING_LINES);
    lines.split_at(keep)
}

fn parse_records(lines: &[String]) -> Result<Vec<Record>, TransformError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| Record::parse(line, idx + 1))
        .collect()
}

fn replace_file(path: &Path, records: &[Record]) -> Result<(), TransformError> {
    let mut contents = Vec::new();
    write_records(records, &mut contents)?;

    // An existing output is replaced through any symlinks and keeps its mode.
    let (dest, permissions) = match fs::canonicalize(path) {
        Ok(real) => {
            let permissions = fs::metadata(&real)
                .map_err(|source| TransformError::Write {
                    path: real.clone(),
                    source,
                })?
                .permissions();
            (real, Some(permissions))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(source) => {
            return Err(TransformError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let tmp_path = temp_path(&dest)?;
    debug!("writing {} bytes to {}", contents.len(), tmp_path.display());
    if let Err(source) = write_and_sync(&tmp_path, &contents, permissions) {
        remove_temp(&tmp_path);
        return Err(TransformError::Write {
            path: tmp_path,
            source,
        });
    }

    debug!("renaming {} -> {}", tmp_path.display(), dest.display());
    fs::rename(&tmp_path, &dest).map_err(|source| {
        remove_temp(&tmp_path);
        TransformError::Write { path: dest, source }
    })
}

fn write_and_sync(
    path: &Path,
    contents: &[u8],
    permissions: Option<Permissions>,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.sync_all()
}

fn remove_temp(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        debug!("could not remove {}: {}", path.display(), err);
    }
}

/// `.<name>.tmp` next to `path`, so the final rename stays on one filesystem.
fn temp_path(path: &Path) -> Result<PathBuf, TransformError> {
    let name = path.file_name().ok_or_else(|| TransformError::Write {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
    })?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}
