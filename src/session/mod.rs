//! Session: store, lifecycle controller and mint operation
//!
//! ```text
//! user action ──► SessionController / Minter ──► SessionStore ──► watch() ──► render
//! provider event ──► EventPump ──► SessionController ──► SessionStore
//! ```

mod controller;
mod mint;
mod store;

pub use controller::{EventPump, SessionController};
pub use mint::Minter;
pub use store::{MintStatus, SessionPhase, SessionSnapshot, SessionStore};
