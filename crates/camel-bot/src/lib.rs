pub mod bot;
pub mod policy;

pub use bot::{BotFeatures, BotParams, is_legal, legal_actions};
pub use policy::{Decision, HintPolicy, Policy, PolicyContext, RandomPolicy, RollPolicy};
