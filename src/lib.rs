//! # fixraster: fixed-point triangle setup
//!
//! Turns three transformed vertices with texture coordinates into a
//! [`RasterizedTriangle`]: a small fixed-point record a renderer steps with
//! additions only. A renderer with little memory can restart the record at any
//! scanline with [`calc_line_increment`] and render the screen in bands.
//!
//! - `vector`: `Vec2`/`Vec3`/`Vec4` float math
//! - `fixed`: Q-format numbers, rounding and overflow policy
//! - `geometry`: float and integer edge functions, sub-pixel snapping, pixel-centre spans
//! - `triangle`: the record handed to the renderer
//! - `rasterizer`: `rasterize` and `calc_line_increment`
//! - `screen`, `texture`, `rectangle`: a software renderer for the records

// Core math
pub mod vector;
pub mod fixed;
pub mod geometry;

// Triangle setup
pub mod color;
pub mod error;
pub mod triangle;
pub mod rasterizer;

// Software renderer consuming the records
pub mod rectangle;
pub mod screen;
pub mod texture;

pub use color::Color;
pub use error::RejectReason;
pub use fixed::{Fixed, OverflowPolicy, Rounding};
pub use geometry::{edge_function_fixed, edge_function_float};
pub use rasterizer::{CullMode, DEFAULT_FRAC_BITS, Rasterizer, Viewport, calc_line_increment};
pub use triangle::RasterizedTriangle;
pub use vector::{Vec2, Vec3, Vec4};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
