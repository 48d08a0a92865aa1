pub mod api;
pub mod config;
pub mod logging;
pub mod request;
pub mod session;
pub mod terminal;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
mod test_support;
