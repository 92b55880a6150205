pub mod dialogue;
pub mod extract;
pub mod reservations;
pub mod session;
pub mod twiml;
