pub mod task;
pub mod todo;
pub mod label;
pub mod note;
pub mod config;

pub use task::*;
pub use todo::*;
pub use label::*;
pub use note::*;
pub use config::*;
