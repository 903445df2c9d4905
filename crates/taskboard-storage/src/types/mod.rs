//! Record and parameter types shared by storage backends and the core.

mod access;
mod assignments;
mod ids;
mod tasks;
mod workspaces;

pub use access::*;
pub use assignments::*;
pub use ids::*;
pub use tasks::*;
pub use workspaces::*;
