//! Command handlers for the policy CLI.

pub mod ask;
pub mod corpus;
pub mod demo;

pub use ask::AskCommand;
pub use corpus::CorpusCommand;
pub use demo::DemoCommand;
