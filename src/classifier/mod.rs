pub mod intent;
pub mod rules;

pub use intent::classify_intent;
pub use rules::classify;
