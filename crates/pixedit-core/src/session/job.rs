//! Transforms computed away from the session.
//!
//! A [`Job`] owns a snapshot of the committed buffer, so it can be sent to
//! another thread (or a web worker) and run there. The session tags each
//! job with its generation and only commits the output if nothing has
//! changed in the meantime.

use crate::raster::RasterBuffer;
use crate::transform::{Transform, TransformError};

/// A transform captured against one committed buffer.
#[derive(Debug, Clone)]
pub struct Job {
    generation: u64,
    source: RasterBuffer,
    transform: Transform,
}

impl Job {
    pub(crate) fn new(generation: u64, source: RasterBuffer, transform: Transform) -> Self {
        Self {
            generation,
            source,
            transform,
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Apply the transform. Pure; safe to call on any thread.
    pub fn run(self) -> JobOutput {
        let result = self.transform.apply(&self.source);
        JobOutput {
            generation: self.generation,
            transform: self.transform,
            result,
        }
    }
}

/// The result of [`Job::run`], handed back to the session.
#[derive(Debug, Clone)]
pub struct JobOutput {
    generation: u64,
    transform: Transform,
    result: Result<RasterBuffer, TransformError>,
}

impl JobOutput {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub(crate) fn into_result(self) -> Result<RasterBuffer, TransformError> {
        self.result
    }
}

/// What the session did with a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The output became the new committed buffer.
    Committed,
    /// The committed buffer changed after the job started; output dropped.
    Discarded,
}
