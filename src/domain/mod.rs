// Domain layer: dataset model, option helpers and the ports the import stage is driven through.

pub mod model;
pub mod ports;
