// Domain layer: entity models and the record source port.

pub mod model;
pub mod ports;
