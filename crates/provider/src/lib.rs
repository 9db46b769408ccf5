pub mod giphy;
pub mod model;
pub mod traits;

pub use giphy::*;
pub use traits::*;
