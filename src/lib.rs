pub mod game;
pub mod game_loop;
pub mod grid;
pub mod input;
pub mod piece;
