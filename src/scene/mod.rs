//! Deferred physically based rendering of 3D scenes.
//!
//! A `Scene` holds renderables, directional lights, a sky and the camera. The
//! `Renderer` draws it in a fixed sequence of passes (see `renderer`) and
//! composes the tone mapped result into a viewport of the screen.
//!
//! ```
//! use prism::scene::{Renderer, Scene};
//! use prism::settings::SceneSettings;
//! use prism::video::prelude::*;
//!
//! let mut device = Device::headless();
//! let settings = SceneSettings::default();
//! let mut renderer = Renderer::new(&mut device, &settings, 320, 240).unwrap();
//!
//! let scene = Scene::new(&settings);
//! renderer.draw(&mut device, &scene, Viewport::with_size(320, 240)).unwrap();
//! renderer.delete(&mut device).unwrap();
//! ```

pub mod camera;
pub mod framebuffers;
pub mod material;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod shaders;

pub use self::camera::{projection_matrix, Camera, FoVMode, FAR, NEAR};
pub use self::framebuffers::Framebuffers;
pub use self::material::{create_pbr_program, Material};
pub use self::mesh::{attributes, StaticMesh, StaticVertex};
pub use self::renderer::{luminance, next_exposure, Renderer};
pub use self::scene::{
    DirectionalLight, DirectionalLightHandle, ModelMesh, ModelNode, Renderable,
    RenderableHandle, Scene, Sky, SubMesh,
};
pub use self::shaders::PbrFeatures;
