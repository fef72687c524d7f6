pub mod casino;

pub use casino::*;
