pub mod color;
pub mod identity;
pub mod scene;
pub mod shape;
pub mod value;

pub use color::Color;
pub use identity::{IdentityKey, Peer, ShapeTarget};
pub use scene::{ContainerId, Scene, ShapeId};
pub use shape::{ChartFamily, Orientation, Shape, ShapeKind};
pub use value::{AnimValue, DUMMY_COORDINATE, GeometryVec, align_point_arrays};
