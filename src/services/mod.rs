pub mod mini_game_service;
pub mod sector_selection;
pub mod wheel_service;

pub use mini_game_service::*;
pub use sector_selection::*;
pub use wheel_service::*;
