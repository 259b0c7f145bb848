pub mod controller;
pub mod crud;
pub mod routes;

pub use routes::favorite_routes;
