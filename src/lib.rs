#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod source;
pub mod theme;
pub mod topology;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{Result, TopologyError};
pub use layout::{Layout, LayoutOptions, compute_layout, compute_layout_with, detect_architecture};
pub use topology::{TopologySnapshot, parse_topology, synthetic_topology};
