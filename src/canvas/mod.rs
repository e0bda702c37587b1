//! Immediate-mode 2D drawing on top of the video device.
//!
//! A `Canvas` records rectangles, images, text, filled shapes and stroked
//! contours into three dynamic meshes and a command queue, then executes the
//! whole frame in a single render pass.
//!
//! Filled shapes with a fill rule are drawn in two steps. The sub-paths are
//! first rendered as triangle fans into the stencil buffer only, counting
//! windings up for front faces and down for back faces. The same fans are
//! drawn again with the fill color wherever the stencil test for the rule
//! passes, resetting the stencil on the way.
//!
//! ```
//! use prism::canvas::Canvas;
//! use prism::math::Vector2;
//! use prism::settings::CanvasSettings;
//! use prism::video::prelude::*;
//!
//! let mut device = Device::headless();
//! let settings = CanvasSettings::default();
//! let mut canvas = Canvas::new(&mut device, &settings, Vector2::new(320, 240)).unwrap();
//!
//! canvas.begin();
//! canvas.set_solid_color(Color::RED);
//! canvas.fill_rectangle(Vector2::new(10.0, 10.0), Vector2::new(100.0, 50.0)).unwrap();
//! canvas.end(&mut device).unwrap();
//! ```

pub mod canvas;
pub mod font;
pub mod mesh;
pub mod path;
pub mod renderer;
pub mod shaders;

pub use self::canvas::{Canvas, Layer};
pub use self::font::{AtlasLayout, Font, FontFactory, FontHandle, Glyph};
pub use self::mesh::{ContourVertex, Mesh, MeshVertex, ShapeVertex, TextVertex};
pub use self::path::{Contour, ContourPoint, Fill, FillMode, ImageFill, Path, Shape, Stroke};
pub use self::renderer::{DrawState, Renderer};
