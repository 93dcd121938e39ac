pub mod config;
pub mod init;
pub mod list;
pub mod post_compact;
pub mod pre_compact;
pub mod session_start;
pub mod show;
