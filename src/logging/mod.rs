pub mod init;
pub mod view;
