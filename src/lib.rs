pub mod classify;
pub mod config;
pub mod draw_fetch;
pub mod error;
pub mod expand;
pub mod form;
pub mod generate;
pub mod http_client;
pub mod outcome;
pub mod signal;
pub mod sportsdb;
pub mod team_names;
