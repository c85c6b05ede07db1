/*
 *  display/error.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for display subsystem
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::error::Error;

/// Unified error type for all display operations
#[derive(Debug)]
pub enum DisplayError {
    /// Frame handed to a sink does not match the panel
    FrameSizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Artwork could not be fetched or decoded
    Artwork(String),

    /// Writing the frame out failed
    Io(std::io::Error),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::FrameSizeMismatch { expected, actual } =>
                write!(f, "Frame size mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::Artwork(msg) =>
                write!(f, "Artwork error: {}", msg),
            DisplayError::Io(err) =>
                write!(f, "Display I/O error: {}", err),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err)
    }
}

impl From<crate::artwork::ArtworkError> for DisplayError {
    fn from(err: crate::artwork::ArtworkError) -> Self {
        DisplayError::Artwork(err.to_string())
    }
}
