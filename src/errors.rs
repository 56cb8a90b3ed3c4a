// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The failures a render can report to its caller.  Broken pipeline
//! invariants are not in here: those panic at the point of discovery.

use failure::Fail;
use std::io;

/// Everything that can go wrong with a run that is not a bug in the
/// pipeline itself.
#[derive(Debug, Fail)]
pub enum Error {
    /// The run configuration cannot describe a render.  Detected
    /// before any thread is started.
    #[fail(display = "invalid configuration: {}", _0)]
    Configuration(String),

    /// The output file could not be created.  The image was already
    /// computed; it is simply not written.
    #[fail(display = "could not create {}: {}", path, cause)]
    ResourceCreation {
        /// The file we tried to create.
        path: String,
        /// Why the operating system refused.
        #[cause]
        cause: io::Error,
    },

    /// The encoder failed partway through writing the image.
    #[fail(display = "could not encode image: {}", _0)]
    Encode(#[cause] io::Error),

    /// The run was cancelled before every pixel arrived.
    #[fail(display = "render cancelled after {} of {} pixels", written, total)]
    Cancelled {
        /// Pixels written into the raster before the pipeline drained.
        written: usize,
        /// Pixels the run would have written.
        total: usize,
    },
}

impl Error {
    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
