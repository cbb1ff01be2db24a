// Domain layer: row model, table descriptors, reports, and the ports the engine drives.

pub mod model;
pub mod ports;
