pub mod analyzer;
pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod index;
pub mod pagination;
pub mod resolver;
pub mod response;
