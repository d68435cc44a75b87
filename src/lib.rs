#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod api;
pub mod analysis;
pub mod app;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod store;
pub mod util;
