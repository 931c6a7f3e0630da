//! Run-length and delta transforms for sector cell buffers
//!
//! Every landscape record stores fixed-size grids of 2304 cells (one 48x48
//! sector). The record formats combine a handful of transforms over those
//! grids:
//!
//! - **Repeat runs** (`.hei`, `.dat` decorations): a byte below 128 is a
//!   literal, a byte of 128 or more repeats the last literal `byte - 128`
//!   times.
//! - **Zero runs** (`.dat` walls, roofs and directions, `.loc`): a byte below
//!   128 is a literal, a byte of 128 or more stands for `byte - 128` cells
//!   holding no value.
//! - **Scrambling** (`.hei` only): heights and colours are stored halved and
//!   delta coded against a seeded accumulator, visiting cells row by row.
//! - **Delta** (`.jm` only): plain wrapping differences between neighbours.
//!
//! All decoders count produced cells instead of trusting the input length, so
//! a stream that stops short fails with [`LandscapeError::TruncatedInput`] and
//! a run that overshoots the grid fails with [`LandscapeError::MalformedEntry`].

use crate::error::{LandscapeError, Result};

/// Width and height of a sector in tiles
pub const SECTOR_SIZE: usize = 48;

/// Number of cells in one sector buffer
pub const MAX_CELLS: usize = SECTOR_SIZE * SECTOR_SIZE;

/// Bytes below this value are literals in both run-length schemes
pub const RUN_THRESHOLD: u8 = 128;

/// Largest run a single token can describe
pub const MAX_RUN: u8 = 127;

/// Accumulator seed for terrain heights in `.hei` records
pub const HEIGHT_SEED: u8 = 64;

/// Accumulator seed for terrain colours in `.hei` records
pub const COLOUR_SEED: u8 = 35;

/// One 48x48 grid of byte cells, indexed by `x * 48 + y`
pub type CellBuffer = [u8; MAX_CELLS];

/// Index of a cell within a sector buffer
#[inline]
pub const fn cell_index(x: usize, y: usize) -> usize {
    x * SECTOR_SIZE + y
}

/// Byte cursor over a record with field-aware error reporting
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Read the next byte of `field`
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(LandscapeError::TruncatedInput {
                field,
                needed: self.offset + 1,
                available: self.data.len(),
            })?;
        self.offset += 1;
        Ok(byte)
    }

    /// Read a big-endian `u16` of `field`
    pub fn read_u16_be(&mut self, field: &'static str) -> Result<u16> {
        let bytes = self.take(field, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Borrow the next `len` bytes of `field`
    pub fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8]> {
        let end = self.offset + len;
        if end > self.data.len() {
            return Err(LandscapeError::TruncatedInput {
                field,
                needed: end,
                available: self.data.len(),
            });
        }
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    /// Read a flat, uncompressed cell buffer of `field`
    pub fn read_cells(&mut self, field: &'static str) -> Result<CellBuffer> {
        let mut cells = [0u8; MAX_CELLS];
        cells.copy_from_slice(self.take(field, MAX_CELLS)?);
        Ok(cells)
    }
}

/// Advance `cell` by a run of `len`, rejecting runs that leave the grid
fn advance_run(cell: usize, len: usize, field: &'static str) -> Result<usize> {
    let end = cell + len;
    if end > MAX_CELLS {
        return Err(LandscapeError::MalformedEntry {
            field,
            produced: end,
        });
    }
    Ok(end)
}

/// Decode a repeat-run stream into a full cell buffer
///
/// The remembered literal starts at zero, so a stream may open with a run.
pub fn decode_repeat_runs(reader: &mut ByteReader<'_>, field: &'static str) -> Result<CellBuffer> {
    let mut cells = [0u8; MAX_CELLS];
    let mut last_literal = 0u8;
    let mut cell = 0;

    while cell < MAX_CELLS {
        let token = reader.read_u8(field)?;

        if token < RUN_THRESHOLD {
            cells[cell] = token;
            last_literal = token;
            cell += 1;
        } else {
            let end = advance_run(cell, usize::from(token - RUN_THRESHOLD), field)?;
            cells[cell..end].fill(last_literal);
            cell = end;
        }
    }

    Ok(cells)
}

/// Encode a cell buffer as a repeat-run stream
///
/// Every value must be a valid literal (below 128).
pub fn encode_repeat_runs(cells: &CellBuffer, field: &'static str) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(MAX_CELLS / 4);
    let mut last_literal = 0u8;
    let mut run_token: Option<usize> = None;

    for (index, &value) in cells.iter().enumerate() {
        check_literal(value, index, field)?;

        if value != last_literal {
            encoded.push(value);
            last_literal = value;
            run_token = None;
            continue;
        }

        match run_token {
            Some(token) if encoded[token] < RUN_THRESHOLD + MAX_RUN => encoded[token] += 1,
            _ => {
                run_token = Some(encoded.len());
                encoded.push(RUN_THRESHOLD + 1);
            }
        }
    }

    Ok(encoded)
}

/// Walk a zero-run stream, calling `visit` for every literal cell
///
/// Runs are skipped without touching the destination, which lets callers
/// overlay sparse layers onto cells filled by earlier passes.
pub fn decode_sparse_runs(
    reader: &mut ByteReader<'_>,
    field: &'static str,
    mut visit: impl FnMut(usize, u8),
) -> Result<()> {
    let mut cell = 0;

    while cell < MAX_CELLS {
        let token = reader.read_u8(field)?;

        if token < RUN_THRESHOLD {
            visit(cell, token);
            cell += 1;
        } else {
            cell = advance_run(cell, usize::from(token - RUN_THRESHOLD), field)?;
        }
    }

    Ok(())
}

/// Decode a zero-run stream into a full cell buffer
pub fn decode_zero_runs(reader: &mut ByteReader<'_>, field: &'static str) -> Result<CellBuffer> {
    let mut cells = [0u8; MAX_CELLS];
    decode_sparse_runs(reader, field, |cell, value| cells[cell] = value)?;
    Ok(cells)
}

/// Encode a cell buffer as a zero-run stream
///
/// Non-zero values must be valid literals (below 128).
pub fn encode_zero_runs(cells: &CellBuffer, field: &'static str) -> Result<Vec<u8>> {
    let mut encoded = Vec::with_capacity(MAX_CELLS / 8);
    let mut run_token: Option<usize> = None;

    for (index, &value) in cells.iter().enumerate() {
        if value != 0 {
            check_literal(value, index, field)?;
            encoded.push(value);
            run_token = None;
            continue;
        }

        match run_token {
            Some(token) if encoded[token] < RUN_THRESHOLD + MAX_RUN => encoded[token] += 1,
            _ => {
                run_token = Some(encoded.len());
                encoded.push(RUN_THRESHOLD + 1);
            }
        }
    }

    Ok(encoded)
}

fn check_literal(value: u8, index: usize, field: &'static str) -> Result<()> {
    if value >= RUN_THRESHOLD {
        return Err(LandscapeError::UnencodableValue {
            field,
            index,
            value: i64::from(value),
        });
    }
    Ok(())
}

/// Restore halved, delta-coded `.hei` values in place
///
/// Cells are visited row by row (`y` outer, `x` inner). Each stored value is
/// added to the low seven bits of the accumulator and the result doubled.
pub fn unscramble(cells: &mut CellBuffer, seed: u8) {
    let mut accumulator = seed;

    for y in 0..SECTOR_SIZE {
        for x in 0..SECTOR_SIZE {
            let index = cell_index(x, y);
            accumulator = cells[index].wrapping_add(accumulator & 0x7f);
            cells[index] = accumulator.wrapping_mul(2);
        }
    }
}

/// Inverse of [`unscramble`]: halve and delta code against `seed`
///
/// The low bit of every value is dropped; values produced by [`unscramble`]
/// are always even, so decoded buffers survive the trip unchanged.
pub fn scramble(cells: &CellBuffer, seed: u8) -> CellBuffer {
    let mut scrambled = [0u8; MAX_CELLS];
    let mut accumulator = seed;

    for y in 0..SECTOR_SIZE {
        for x in 0..SECTOR_SIZE {
            let index = cell_index(x, y);
            let delta = (cells[index] >> 1).wrapping_sub(accumulator & 0x7f) & 0x7f;
            scrambled[index] = delta;
            accumulator = accumulator.wrapping_add(delta);
        }
    }

    scrambled
}

/// Store each cell as the wrapping difference from its predecessor
pub fn delta_encode(cells: &CellBuffer) -> CellBuffer {
    let mut encoded = [0u8; MAX_CELLS];
    let mut previous = 0u8;

    for (slot, &value) in encoded.iter_mut().zip(cells.iter()) {
        *slot = value.wrapping_sub(previous);
        previous = value;
    }

    encoded
}

/// Rebuild cells from wrapping differences with a running sum
pub fn delta_decode(deltas: &CellBuffer) -> CellBuffer {
    let mut cells = [0u8; MAX_CELLS];
    let mut sum = 0u8;

    for (slot, &delta) in cells.iter_mut().zip(deltas.iter()) {
        sum = sum.wrapping_add(delta);
        *slot = sum;
    }

    cells
}
