//! One module per subcommand, plus shared plumbing in [`support`].

pub mod changes;
pub mod check;
pub mod completions;
pub mod incidents;
pub mod setup;
pub mod show;
pub mod summary;
pub mod support;
