//! Bot systems (FixedUpdate, строго в порядке chain)
//!
//! 1. advance_arena_clock: игровое время
//! 2. bot_consume_pellets: PelletEaten → промоушен в команду
//! 3. bot_think: снимок арены → BotBrain::tick → события
//! 4. sync_bot_intents: BotBrain.mouse → MouseIntent

pub mod bonding;
pub mod decision;
pub mod outputs;

// Re-export all systems
pub use bonding::*;
pub use decision::*;
pub use outputs::BotOutputs;
