// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod odoo;
pub mod xmlrpc;

pub use odoo::OdooClient;
