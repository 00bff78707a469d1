// Application layer: command protocol, team mutations and the event loop
// that sits between the TUI and the REST API.

pub mod app;
pub mod import;
pub mod mutation;
pub mod protocol;
