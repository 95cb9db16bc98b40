pub mod backends;
pub mod traits;

pub use backends::WrappingPolyRing;
pub use traits::{PolyRing, PolySampler, ScaledTensor};
