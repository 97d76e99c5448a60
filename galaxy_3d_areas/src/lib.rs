/*!
# Galaxy 3D Areas

Spatial index of game-world areas for the Galaxy 3D engine.

Areas are axis-aligned boxes or spheres tagged with category flags (visibility,
editor picking, shadows, ...). They are stored in a loose octree over a sparse
grid of root cells, so thousands of static and moving areas can be culled
against a camera frustum or picked with a ray every frame.

## Architecture

- **AreaSystem**: owns every area and answers queries
- **SpatialTree**: node arena, root grid, and placement (internal)
- **Reoptimizer**: per-depth queues that tighten stale node bounds a few at a time (internal)
- **VisibilityTracker**: double-buffered bitset producing per-group
  newly-visible / newly-invisible lists (internal)

Typical frame: mutate areas, call `optimize()`, then run queries and
`update_visibility()`.
*/

// Internal modules
mod error;
mod engine;
mod utils;
pub mod log;
pub mod geometry;
pub mod area;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Area system entry point
    pub use crate::area::AreaSystem;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Area sub-module
    pub mod area {
        pub use crate::area::*;
    }
}

// Re-export math library at crate root
pub use glam;
