pub mod algebra_2d;
pub mod config;
pub mod console_drawer;
pub mod discretizer;
pub mod mechanics;
