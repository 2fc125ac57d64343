// Domain layer: plain data types and the ports (traits) the core renders and hands off through.

pub mod model;
pub mod ports;
