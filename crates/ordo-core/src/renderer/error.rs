// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::geom::{GeomId, VertexFormat};
use crate::renderer::api::OutputTypes;
use std::fmt;

/// An error produced when a geometry cannot be adapted for a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MungeError {
    /// The geometry lacks vertex columns the backend requires.
    MissingColumns {
        /// The geometry that could not be adapted.
        geom: GeomId,
        /// The required columns that are absent.
        missing: VertexFormat,
    },
}

impl fmt::Display for MungeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MungeError::MissingColumns { geom, missing } => {
                write!(f, "Geometry {geom:?} cannot be adapted, missing {missing:?}")
            }
        }
    }
}

impl std::error::Error for MungeError {}

/// An error produced by a graphics pipe while creating guardians or outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// The pipe could not be initialized on this system.
    InvalidPipe(String),
    /// The pipe cannot create an output of the requested types.
    UnsupportedOutput {
        /// The output types requested.
        requested: OutputTypes,
        /// The output types the pipe supports.
        supported: OutputTypes,
    },
    /// The request needs a new guardian but forbids creating one.
    GuardianRequired,
    /// The guardian to share with belongs to another pipe or is no longer valid.
    IncompatibleGuardian,
    /// No pipe is registered under the given name.
    UnknownPipe(String),
    /// Creating the guardian failed in the backend.
    GuardianCreationFailed(String),
}

impl fmt::Display for PipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeError::InvalidPipe(msg) => write!(f, "Graphics pipe is not valid: {msg}"),
            PipeError::UnsupportedOutput {
                requested,
                supported,
            } => write!(
                f,
                "Unsupported output types {requested:?} (pipe supports {supported:?})"
            ),
            PipeError::GuardianRequired => {
                write!(f, "The output needs a new guardian but NO_NEW_GSG was set")
            }
            PipeError::IncompatibleGuardian => {
                write!(f, "The guardian cannot be shared with this pipe")
            }
            PipeError::UnknownPipe(name) => write!(f, "No graphics pipe named '{name}'"),
            PipeError::GuardianCreationFailed(msg) => {
                write!(f, "Failed to create graphics state guardian: {msg}")
            }
        }
    }
}

impl std::error::Error for PipeError {}

/// A high-level error that can occur during frame rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A draw call was issued outside `begin_frame` / `end_frame`.
    NotInFrame,
    /// The guardian has been closed or lost its context.
    InvalidGuardian,
    /// The backend rejected a draw call.
    DrawFailed {
        /// The geometry being drawn.
        geom: GeomId,
        /// The backend's explanation.
        reason: String,
    },
    /// A geometry could not be adapted for the backend.
    Munge(MungeError),
    /// An error reported by the graphics pipe.
    Pipe(PipeError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInFrame => write!(f, "Draw call issued outside of a frame."),
            RenderError::InvalidGuardian => {
                write!(f, "The graphics state guardian is no longer valid.")
            }
            RenderError::DrawFailed { geom, reason } => {
                write!(f, "Drawing geometry {geom:?} failed: {reason}")
            }
            RenderError::Munge(err) => write!(f, "Geometry adaptation failed: {err}"),
            RenderError::Pipe(err) => write!(f, "Graphics pipe error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Munge(err) => Some(err),
            RenderError::Pipe(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MungeError> for RenderError {
    fn from(err: MungeError) -> Self {
        RenderError::Munge(err)
    }
}

impl From<PipeError> for RenderError {
    fn from(err: PipeError) -> Self {
        RenderError::Pipe(err)
    }
}
