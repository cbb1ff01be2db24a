// Adapters layer: concrete implementations of the domain ports.

pub mod rest;

pub use rest::RestClient;
