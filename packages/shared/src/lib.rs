pub mod deck;
pub mod models;
pub mod repositories;
pub mod services;
pub mod trophies;
