pub mod galaxy;
pub mod health;
pub mod routes;
