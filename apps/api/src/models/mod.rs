pub mod cv;
pub mod view;
