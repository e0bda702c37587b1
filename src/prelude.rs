pub use crate::errors::{Error, Invariant, Result};
pub use crate::math;
pub use crate::math::prelude::{Matrix, One, SquareMatrix, Zero};
pub use crate::math::{Aabb2, Color};

pub use crate::video;
pub use crate::video::prelude::*;

pub use crate::canvas;
pub use crate::canvas::{Canvas, Fill, FillMode, FontHandle};

pub use crate::scene;
pub use crate::scene::{Camera, DirectionalLight, FoVMode, Material, Scene};

pub use crate::sched::{Promise, Scheduler, Worker};
pub use crate::settings::{CanvasSettings, SceneSettings, Settings, ToneMapping};
