#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Region-parallel Mandelbrot renderer
//!
//! The Mandelbrot set is the set of complex numbers `c` for which the
//! sequence `z(0) = 0, z(n+1) = z(n)² + c` stays bounded.  Each pixel
//! of the image is mapped to a point `c` on the complex plane and
//! shaded by how many iterations its sequence takes to escape.
//!
//! Rendering is split into square regions of the image.  A dispatcher
//! hands each region to a worker thread of its own, but never lets
//! more than a fixed number of workers run at once: it holds a pool of
//! tokens, and a worker has to take one to start and gives it back
//! when it is done.  Workers stream finished pixels to a single
//! aggregator, which owns the image and knows it is finished when the
//! last expected pixel arrives.
//!
//! ```no_run
//! use parabrot::{encode, ImageFormat, Pipeline, RunConfig};
//! use std::path::Path;
//!
//! let config = RunConfig::with_size(600, 400);
//! let rendered = Pipeline::new(&config).run().unwrap();
//! let path = encode::output_path(Path::new("."), &config, ImageFormat::Png);
//! encode::write_image(&path, &rendered.raster, ImageFormat::Png).unwrap();
//! ```

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;

pub mod admission;
pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod encode;
pub mod errors;
pub mod escape;
pub mod naive;
pub mod pipeline;
pub mod planes;
pub mod progress;
pub mod regions;
pub mod worker;

pub use aggregate::Raster;
pub use cancel::Cancellation;
pub use config::{PlaneBounds, RunConfig};
pub use encode::ImageFormat;
pub use errors::{Error, Result};
pub use escape::{Color, EscapeTest, Mandelbrot, PixelComputer};
pub use naive::NaiveRenderer;
pub use pipeline::{Pipeline, Rendered};
pub use regions::{Region, RegionPartitioner};
