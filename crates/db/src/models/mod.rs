pub mod canvas;
pub mod move_code;
pub mod user;
