pub mod app;
pub mod config;
pub mod dom;
pub mod error;
pub mod error_presenter;
pub mod fields;
pub mod ids;
pub mod submit;

#[cfg(target_arch = "wasm32")]
mod start;

pub use app::*;
pub use config::*;
pub use dom::*;
pub use error::*;
pub use error_presenter::*;
pub use fields::*;
pub use ids::*;
pub use submit::*;
