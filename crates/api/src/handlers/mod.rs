pub mod actions;
pub mod auth;
pub mod chat;
pub mod executions;
pub mod workflows;
