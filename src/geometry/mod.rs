pub mod bounds;
pub mod containment;
pub mod ellipse;
pub mod frame;
pub mod plane;
pub mod solid;
pub mod volume;

pub use bounds::Aabb;
pub use containment::PointClassification;
pub use ellipse::{ellipse_perimeter, Ellipse};
pub use frame::{PlacedSolid, SolidFrame};
pub use plane::Plane;
pub use solid::{PriorityOverride, Solid, SolidId, SolidKind};
