//! Serialization for run-length arrays
//!
//! Plain text format listing the canonical runs of every stored row.
//!
//! ```text
//! \nRleBinary Version 1\n
//! ndim = N, w = W, h = H, d = D, nrows = R\n
//! <z> <y>: <start>-<end> <start>-<end> ...\n   (R lines, ascending (z, y))
//! ```
//!
//! 2D arrays are written with `ndim = 2`, `d = 1` and `z = 0` on every row.
//! Readers reject out-of-range keys or runs, keys out of order, and run
//! lists that are not canonical.

use crate::array::RunLengthArray;
use crate::error::{Error, Result};
use crate::rle::{RunLengthBinaryArray2D, RunLengthBinaryArray3D};
use crate::row::BinaryRow;
use crate::run::Run;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Format version
const RLE_VERSION: i32 = 1;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: u64 = 500_000_000;

const TYPE_NAME: &str = "RleBinary";

impl RunLengthBinaryArray2D {
    /// Read a 2D array from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> Result<Self> {
        Self::read_from_bytes(&read_limited(reader)?)
    }

    /// Read a 2D array from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }

    /// Read a 2D array from a byte slice.
    pub fn read_from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = decode(data)?;
        if decoded.ndim != 2 {
            return Err(Error::DecodeError(format!(
                "expected a 2D array, found ndim = {}",
                decoded.ndim
            )));
        }
        let mut array = RunLengthBinaryArray2D::new(decoded.size[0], decoded.size[1])?;
        for ((_, y), row) in decoded.rows {
            array.put_row(y, row)?;
        }
        Ok(array)
    }

    /// Write the array to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        let (w, h) = self.size();
        let rows = self.rows().map(|(y, row)| ((0, y), row));
        encode(writer, 2, [w, h, 1], self.row_map().len(), rows)
    }

    /// Write the array to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the array to a byte vector.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

impl RunLengthBinaryArray3D {
    /// Read a 3D array from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> Result<Self> {
        Self::read_from_bytes(&read_limited(reader)?)
    }

    /// Read a 3D array from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }

    /// Read a 3D array from a byte slice.
    pub fn read_from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = decode(data)?;
        if decoded.ndim != 3 {
            return Err(Error::DecodeError(format!(
                "expected a 3D array, found ndim = {}",
                decoded.ndim
            )));
        }
        let [w, h, d] = decoded.size;
        let mut array = RunLengthBinaryArray3D::new(w, h, d)?;
        for ((z, y), row) in decoded.rows {
            array.put_row(z, y, row)?;
        }
        Ok(array)
    }

    /// Write the array to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        let (w, h, d) = self.size();
        let nrows = self.stored_row_count();
        encode(writer, 3, [w, h, d], nrows, RunLengthArray::rows(self))
    }

    /// Write the array to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the array to a byte vector.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

struct Decoded {
    ndim: usize,
    size: [u32; 3],
    rows: Vec<((i32, i32), BinaryRow)>,
}

fn read_limited(reader: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(MAX_INPUT_SIZE + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_INPUT_SIZE {
        return Err(Error::DecodeError(format!(
            "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
        )));
    }
    Ok(buf)
}

fn encode<'a, W, I>(writer: &mut W, ndim: usize, size: [u32; 3], nrows: usize, rows: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = ((i32, i32), &'a BinaryRow)>,
{
    writeln!(writer, "\n{TYPE_NAME} Version {RLE_VERSION}")?;
    writeln!(
        writer,
        "ndim = {ndim}, w = {}, h = {}, d = {}, nrows = {nrows}",
        size[0], size[1], size[2]
    )?;
    for ((z, y), row) in rows {
        write!(writer, "{z} {y}:")?;
        for run in row.runs() {
            write!(writer, " {run}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn decode(data: &[u8]) -> Result<Decoded> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::DecodeError(format!("{TYPE_NAME} data is not valid UTF-8: {e}")))?;
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let version_line = lines
        .next()
        .ok_or_else(|| Error::DecodeError(format!("{TYPE_NAME} version line not found")))?;
    let version_prefix = format!("{TYPE_NAME} Version ");
    let version: i32 = version_line
        .strip_prefix(&version_prefix)
        .ok_or_else(|| Error::DecodeError(format!("{TYPE_NAME} version line not found")))?
        .trim()
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse {TYPE_NAME} version: {e}")))?;
    if version != RLE_VERSION {
        return Err(Error::DecodeError(format!(
            "invalid {TYPE_NAME} version: {version}"
        )));
    }

    let dim_line = lines
        .next()
        .ok_or_else(|| Error::DecodeError(format!("{TYPE_NAME} dimension line not found")))?;
    let (ndim, size, nrows) = parse_dim_line(dim_line)?;

    let mut rows: Vec<((i32, i32), BinaryRow)> = Vec::with_capacity(nrows.min(1 << 16));
    for _ in 0..nrows {
        let line = lines.next().ok_or_else(|| {
            Error::DecodeError(format!(
                "{TYPE_NAME} data truncated: expected {nrows} rows, found {}",
                rows.len()
            ))
        })?;
        let (key, row) = parse_row_line(line, size)?;
        if let Some(&(prev, _)) = rows.last()
            && prev >= key
        {
            return Err(Error::DecodeError(format!(
                "row keys out of order: {prev:?} then {key:?}"
            )));
        }
        rows.push((key, row));
    }
    if let Some(extra) = lines.next() {
        return Err(Error::DecodeError(format!(
            "unexpected data after {nrows} rows: '{extra}'"
        )));
    }

    Ok(Decoded { ndim, size, rows })
}

/// Parse "ndim = N, w = W, h = H, d = D, nrows = R"
fn parse_dim_line(line: &str) -> Result<(usize, [u32; 3], usize)> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 5 {
        return Err(Error::DecodeError(format!("invalid dimension line: '{line}'")));
    }
    let ndim: usize = parse_key_value(parts[0], "ndim")?;
    let w: u32 = parse_key_value(parts[1], "w")?;
    let h: u32 = parse_key_value(parts[2], "h")?;
    let d: u32 = parse_key_value(parts[3], "d")?;
    let nrows: usize = parse_key_value(parts[4], "nrows")?;

    if !matches!(ndim, 2 | 3) {
        return Err(Error::DecodeError(format!("unsupported ndim: {ndim}")));
    }
    if ndim == 2 && d != 1 {
        return Err(Error::DecodeError(format!("2D array with depth {d}")));
    }
    if [w, h, d].iter().any(|&v| v == 0 || v > i32::MAX as u32) {
        return Err(Error::DecodeError(format!(
            "invalid dimensions: w={w}, h={h}, d={d}"
        )));
    }
    if nrows as u64 > h as u64 * d as u64 {
        return Err(Error::DecodeError(format!(
            "nrows {nrows} exceeds h*d = {}",
            h as u64 * d as u64
        )));
    }
    Ok((ndim, [w, h, d], nrows))
}

/// Parse "<z> <y>: <s>-<e> ..."
fn parse_row_line(line: &str, size: [u32; 3]) -> Result<((i32, i32), BinaryRow)> {
    let (key_part, runs_part) = line
        .split_once(':')
        .ok_or_else(|| Error::DecodeError(format!("missing ':' in row line '{line}'")))?;
    let mut key_fields = key_part.split_whitespace();
    let (Some(z), Some(y), None) = (key_fields.next(), key_fields.next(), key_fields.next()) else {
        return Err(Error::DecodeError(format!("invalid row key: '{key_part}'")));
    };
    let z: i32 = z
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse z: {e}")))?;
    let y: i32 = y
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse y: {e}")))?;
    if z < 0 || z as u32 >= size[2] || y < 0 || y as u32 >= size[1] {
        return Err(Error::DecodeError(format!(
            "row ({z}, {y}) outside h={}, d={}",
            size[1], size[2]
        )));
    }

    let max_x = size[0] as i64 - 1;
    let mut runs: Vec<Run> = Vec::new();
    for field in runs_part.split_whitespace() {
        let (s, e) = field
            .split_once('-')
            .ok_or_else(|| Error::DecodeError(format!("invalid run '{field}'")))?;
        let start: i32 = s
            .parse()
            .map_err(|e| Error::DecodeError(format!("failed to parse run start: {e}")))?;
        let end: i32 = e
            .parse()
            .map_err(|e| Error::DecodeError(format!("failed to parse run end: {e}")))?;
        let run = Run::new(start, end)?;
        if start < 0 || end as i64 > max_x {
            return Err(Error::DecodeError(format!(
                "run {run} outside width {}",
                size[0]
            )));
        }
        if let Some(prev) = runs.last()
            && prev.end() as i64 + 1 >= start as i64
        {
            return Err(Error::NonCanonicalRow(format!(
                "row ({z}, {y}): run {run} overlaps or touches {prev}"
            )));
        }
        runs.push(run);
    }
    if runs.is_empty() {
        return Err(Error::NonCanonicalRow(format!(
            "row ({z}, {y}) is stored but empty"
        )));
    }
    Ok(((z, y), BinaryRow::from_runs(runs)))
}

/// Parse "key = value"
fn parse_key_value<T>(s: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| Error::DecodeError(format!("missing '=' in {key} field")))?;
    if name.trim() != key {
        return Err(Error::DecodeError(format!(
            "expected field '{key}', found '{}'",
            name.trim()
        )));
    }
    value
        .trim()
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse {key}: {e}")))
}
