pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod display;
pub mod frame;
pub mod input;
pub mod loaders;
pub mod renderer;
pub mod scene;
pub mod session;

pub use camera::{CameraMode, OrbitCamera};
pub use config::ViewerConfig;
pub use controller::{FrameBuffer, FrameController, RenderMode};
pub use descriptor::{CameraDescriptor, Viewport};
pub use input::{CameraEvent, InputAdapter};
pub use renderer::{PointRenderer, RenderOptions, RenderOutput, SplatRenderer};
pub use scene::SceneHandle;
pub use session::ViewerSession;
