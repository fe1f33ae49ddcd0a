// Rules module
// - evaluators.rs: one pure evaluator per rule kind
// - engine.rs: RuleEngine, which walks a rule tree and recurses into
//   ConstrainContext scopes

pub mod engine;
pub mod evaluators;

pub use engine::*;
