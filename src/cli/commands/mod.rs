pub mod client;
pub mod config;
pub mod dashboard;
pub mod deletion;
pub mod doc;
pub mod field;
pub mod init;
pub mod log;
pub mod report;
pub mod session;
pub mod template;
pub mod user;
