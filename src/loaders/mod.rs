pub mod factory;
pub mod named;
