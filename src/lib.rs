pub mod app;
pub mod braille;
pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod map;
pub mod selection;
pub mod terminal;
pub mod ui;
pub mod viewer;
