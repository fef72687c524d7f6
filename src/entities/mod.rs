pub mod wheel_mini_games;
pub mod wheels;

pub use wheel_mini_games as wheel_mini_game_entity;
pub use wheel_mini_games::MiniGameStatus;
pub use wheels as wheel_entity;
