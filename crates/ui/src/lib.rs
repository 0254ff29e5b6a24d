#![forbid(unsafe_code)]

pub mod views;
pub mod vm;

pub use views::ViewError;
