mod entity;
mod model;
mod narrow;
mod relation;

pub use entity::EntityConfig;
pub use model::{ModelBuilder, RelationModel};
pub use relation::{RelationConfig, RelationKind};
