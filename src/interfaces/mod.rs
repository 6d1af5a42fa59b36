pub mod container;
pub mod invoker;
pub mod loader;
pub mod provider;
