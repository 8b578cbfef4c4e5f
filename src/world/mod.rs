mod load;
mod model;
mod view_state;

pub use load::{load_world, save_world};
pub use model::{Category, Entity, LineStyle, NodeShape, Relationship, World};
pub use view_state::{ViewState, default_view_state_path, load_view_state, save_view_state};
