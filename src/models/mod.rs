pub mod retur;

pub use retur::*;
