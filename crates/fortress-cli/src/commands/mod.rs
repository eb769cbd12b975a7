pub mod folders;
pub mod init;
pub mod misc;
pub mod notes;
pub mod pin;
pub mod session;
