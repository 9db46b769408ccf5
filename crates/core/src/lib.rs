pub mod config;
pub mod credentials;
pub mod error;
pub mod gif;
pub mod paths;
pub mod results;
pub mod selection;

pub use config::*;
pub use credentials::*;
pub use error::*;
pub use gif::*;
pub use paths::*;
pub use results::*;
pub use selection::*;
