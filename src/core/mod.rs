pub mod backend;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod dispatcher;
pub mod keyring;
pub mod message;
pub mod session;
