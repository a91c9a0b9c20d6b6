// src/core/mod.rs

pub mod actions;
pub mod builder;
pub mod config;
pub mod loader;
pub mod menu;
pub mod properties;
pub mod selection;
pub mod validator;
pub mod xml;
