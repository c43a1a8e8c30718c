pub mod cache;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod discogs;
pub mod layout;
pub mod platform;
pub mod repository;
