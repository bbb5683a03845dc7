/// meshview core library - mesh loading, camera interaction and scene state
///
/// This library holds everything the viewers do that does not touch a window
/// or a GPU: OBJ parsing with averaged normals, the arcball camera, projection
/// and transformation matrices, and the render passes issued to a
/// [`RenderBackend`].
pub mod arcball;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod normals;
pub mod obj;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use arcball::{ArcballCamera, DragMode};
pub use backend::{DrawCall, Light, Material, RenderBackend, Shading};
pub use clock::FrameClock;
pub use config::ViewerConfig;
pub use error::{MeshError, MeshResult};
pub use geometry::{BoundingBox, Mesh, Vertex};
pub use input::{Action, InputEvent, Key, MouseButton};
pub use obj::{load_obj, parse_obj};
pub use projection::{Projection, ProjectionMode, Viewport};
pub use scene::{Appearance, Scene};
pub use transform::Transform;
pub use viewer::{BunnyViewer, ModelViewer, Viewer};
