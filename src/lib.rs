pub mod assets;
pub mod capture;
pub mod config;
pub mod detect;
pub mod domain;
pub mod error;
pub mod export;
pub mod render;
pub mod session;

#[cfg(test)]
mod test_utils;
