pub mod application;
pub mod cli;
pub mod domain;
pub mod extraction;
pub mod io;

pub use domain::*;
