pub mod color;
pub mod surface;
pub mod text;
pub mod views;
