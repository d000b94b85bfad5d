pub mod build;
pub mod init;
pub mod run;

pub use build::{build, BuildArgs};
pub use init::{init, InitArgs};
pub use run::{run, RunArgs};
