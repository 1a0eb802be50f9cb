/// Renderer module - backend trait and the value types it consumes

pub mod renderer;
pub mod render_data;
pub mod material_data;
pub mod mock_renderer;

pub use renderer::*;
pub use render_data::*;
pub use material_data::*;
pub use mock_renderer::MockRenderer;
