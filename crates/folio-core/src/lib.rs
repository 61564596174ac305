pub mod beacon;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod prompt;
pub mod site;
pub mod visitor;
