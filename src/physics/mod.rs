pub mod gravity;

pub use gravity::{accelerations, checked_derivatives, derivatives, separation};
