pub mod article;
pub mod context;
pub mod illustrate;
pub mod workflow;
