// Adapters layer: concrete implementations for external systems (http server, weather apis).

pub mod http;
pub mod weather;
