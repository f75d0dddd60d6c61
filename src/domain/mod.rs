// Domain layer: request/response types, the feature order contract, and the ports the
// core depends on.

pub mod model;
pub mod ports;
