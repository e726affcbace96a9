pub mod cascade;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod mutations;
pub mod services;
pub mod startup;
pub mod utils;
