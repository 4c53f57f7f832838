pub mod cli;
pub mod commands;
pub mod model;
pub mod rules;
pub mod storage;
pub mod theme;
pub mod ui;
