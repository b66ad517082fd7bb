pub mod run;
pub mod show_config;

pub use run::*;
pub use show_config::*;
