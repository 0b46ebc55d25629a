//! HTTP API handlers for hrp-rc

pub mod board;
pub mod buildinfo;
pub mod health;

pub use board::{get_board, get_eligibility, BoardError};
pub use buildinfo::get_build_info;
pub use health::health_routes;
