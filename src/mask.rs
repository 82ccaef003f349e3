//! Blocked-cell masks.
//!
//! A mask is a plain text file with one line per grid row: `#` or `X` marks a
//! usage-blocked cell, `.` an open one. Trailing whitespace and blank lines at
//! the end of the file are ignored.

use crate::error::AppError;
use gridmap_solver::{TileGrid, WfcError};
use log::debug;
use std::fs;
use std::path::Path;

/// Row-major usage-blocked flags read from a mask file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedMask {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
}

impl BlockedMask {
    /// Parses mask text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Mask` for unknown characters, ragged rows or an
    /// empty mask.
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let used = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1);

        let mut width = None;
        let mut cells = Vec::new();
        for (row, line) in lines[..used].iter().enumerate() {
            let mut row_width = 0;
            for (column, c) in line.chars().enumerate() {
                let blocked = match c {
                    '#' | 'X' => true,
                    '.' => false,
                    other => {
                        return Err(AppError::Mask {
                            line: row + 1,
                            column: column + 1,
                            message: format!("unexpected character {other:?}"),
                        })
                    }
                };
                cells.push(blocked);
                row_width += 1;
            }
            match width {
                None => width = Some(row_width),
                Some(expected) if expected != row_width => {
                    return Err(AppError::Mask {
                        line: row + 1,
                        column: row_width.min(expected) + 1,
                        message: format!("row has {row_width} cells, expected {expected}"),
                    })
                }
                Some(_) => {}
            }
        }

        match width {
            Some(width) if width > 0 => Ok(Self {
                width,
                height: used,
                cells,
            }),
            _ => Err(AppError::Mask {
                line: 1,
                column: 1,
                message: "mask has no cells".to_owned(),
            }),
        }
    }

    /// Reads and parses a mask file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read, or the errors of [`Self::parse`].
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let mask = Self::parse(&fs::read_to_string(path)?)?;
        debug!(
            "Loaded {}x{} mask from {:?} ({} blocked cells)",
            mask.width,
            mask.height,
            path,
            mask.blocked_count()
        );
        Ok(mask)
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&blocked| blocked).count()
    }

    /// An unassigned grid carrying these blocked flags.
    ///
    /// # Errors
    ///
    /// Never fails for a parsed mask; the error type comes from `TileGrid`.
    pub fn to_grid(&self) -> Result<TileGrid, WfcError> {
        TileGrid::from_blocked_mask(self.width, self.height, &self.cells)
    }
}
