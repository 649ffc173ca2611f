pub mod geom;
pub mod io;
pub mod pipeline;
pub mod request;
pub mod scene;
pub mod sim;

// Prelude
pub use geom::building::Building;
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use geom::wall::Wall;
pub use scene::Scene;
pub use scene::cell::Cell;
pub use sim::config::TransmitterConfig;
pub use sim::engine::{CastResult, cast};
pub use sim::power_map::PowerMap;
