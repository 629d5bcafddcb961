mod matrix;
pub mod ops;
mod vector;

pub use matrix::Matrix;
pub use vector::{Orientation, Vector};
