pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod models;
pub mod seed;
pub mod server;
pub mod whatsapp;
