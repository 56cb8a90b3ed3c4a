// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing the finished raster to disk.

use crate::aggregate::Raster;
use crate::config::RunConfig;
use crate::errors::{Error, Result};
use image::png::PNGEncoder;
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The lossless formats a raster can be written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// 8-bit grayscale PNG.
    Png,
    /// Binary graymap (PGM).
    Pnm,
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Png
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "pnm" | "pgm" => Ok(ImageFormat::Pnm),
            other => Err(format!("unknown image format '{}'", other)),
        }
    }
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Pnm => "pgm",
        }
    }

    /// Serialize `raster` to `out`.
    pub fn encode<W: Write>(self, raster: &Raster, out: W) -> io::Result<()> {
        let (width, height) = (raster.width() as u32, raster.height() as u32);
        match self {
            ImageFormat::Png => {
                PNGEncoder::new(out).encode(raster.as_bytes(), width, height, ColorType::Gray(8))
            }
            ImageFormat::Pnm => {
                let mut encoder = PNMEncoder::new(out)
                    .with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary));
                encoder.encode(raster.as_bytes(), width, height, ColorType::Gray(8))
            }
        }
    }
}

/// Where a run's image goes inside `dir`:
/// `mandelbrot_<width>_<height>_<iterations>.<ext>`.
pub fn output_path(dir: &Path, config: &RunConfig, format: ImageFormat) -> PathBuf {
    dir.join(config.file_name(format.extension()))
}

/// Create `path` and encode `raster` into it.  If the file cannot be
/// created nothing is encoded.
pub fn write_image(path: &Path, raster: &Raster, format: ImageFormat) -> Result<()> {
    let file = File::create(path).map_err(|cause| Error::ResourceCreation {
        path: path.display().to_string(),
        cause,
    })?;
    let mut out = BufWriter::new(file);
    format.encode(raster, &mut out).map_err(Error::Encode)?;
    out.flush().map_err(Error::Encode)?;
    info!("wrote {}", path.display());
    Ok(())
}
