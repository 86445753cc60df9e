// Domain layer: records, the bulk-read query and the ERP capability port.

pub mod model;
pub mod ports;
