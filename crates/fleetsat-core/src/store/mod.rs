// ── Reducer-style domain state store ──
//
// One state value, mutated only by the pure transition function in
// `actions`, consumed from a single action channel in `dispatcher`.

mod actions;
mod dispatcher;
mod state;

pub use actions::{Action, reduce};
pub use dispatcher::StateStore;
pub use state::DomainState;
