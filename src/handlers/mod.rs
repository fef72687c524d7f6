pub mod game;
pub mod mini_game;
pub mod wheel;

pub use game::game_config;
pub use mini_game::mini_game_config;
pub use wheel::wheel_config;
