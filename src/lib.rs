//! # paintcore
//!
//! Pixel-region compositing and transform engine for raster image editors.
//!
//! The crate works on interleaved 8-bit pixel data (1 to 4 channels) laid
//! out row by row with an independent row stride. It provides:
//!
//! - Row primitives: fill, blend, shade, masked composite, darken/lighten,
//!   channel-only and HSV-component modes, saturating add, threshold, scale
//! - The same operations lifted over rectangular pixel regions
//! - N x N integer convolution with normal, absolute and offset output
//! - RGB <-> HSV conversion and a paint-mode dispatcher
//! - Selection masks as per-scanline coverage segments, with boolean
//!   combination, bounds, point tests and stencilled pixel operations
//! - 3x3 matrices and affine resampling with bilinear sampling and an
//!   exact path for quarter-turn rotations
//!
//! ## Architecture
//!
//! Operations are layered:
//!
//! 1. **Pixel regions**: borrowed views describing where pixels live
//! 2. **Row primitives**: one scanline of one operation
//! 3. **Region primitives**: row primitives over whole regions, row-parallel
//! 4. **Selections**: scanline segments deciding which pixels an
//!    operation touches and how strongly
//! 5. **Transforms**: resampling into newly allocated buffers
//!
//! Nothing here installs a logger; diagnostics go through the `log` facade.

// Phase 1: Foundation Types & Math
pub mod basics;
pub mod error;
pub mod matrix;

// Phase 2: Pixel Storage & Row Primitives
pub mod color_space;
pub mod paint_mode;
pub mod pixel_ops;
pub mod pixel_region;

// Phase 3: Region Primitives & Filters
pub mod convolve;
pub mod region_ops;

// Phase 4: Selections
pub mod region;
pub mod stencil;

// Phase 5: Transforms
pub mod transform;

pub use error::{Error, ErrorKind, Result};
pub use pixel_region::{PixelBuffer, PixelRegion, PixelRegionMut, RegionGeometry};
