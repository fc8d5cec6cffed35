// Domain layer: models, scoring rules and ports. No I/O happens here except
// rule-file loading.

pub mod model;
pub mod ports;
pub mod rules;
