mod build;
mod fmt;
mod id;
mod info;
mod init;
mod shell;

pub use build::cmd_build;
pub use fmt::cmd_fmt;
pub use id::cmd_id;
pub use info::cmd_info;
pub use init::cmd_init;
pub use shell::cmd_shell;
pub use test::cmd_test;
