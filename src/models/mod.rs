pub mod grant;
pub mod mini_game;
pub mod prize;
pub mod wheel;

pub use grant::*;
pub use mini_game::*;
pub use prize::*;
pub use wheel::*;
