pub mod direction;
pub mod set;
pub mod took;

pub use direction::Direction;
pub use set::Set;
