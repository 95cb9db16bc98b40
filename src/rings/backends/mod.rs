pub mod wrapping;

pub use wrapping::WrappingPolyRing;
