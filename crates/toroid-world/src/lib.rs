//! Toroidal block window around the observer.
#![forbid(unsafe_code)]

mod bits;
pub mod store;
pub mod window;


pub use bits::BitSet;
pub use store::BlockStore;
pub use window::{WindowDims, WindowShift, pmod};
