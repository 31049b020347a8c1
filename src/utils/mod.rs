pub mod arg_man;
pub mod file_man;
pub mod logger;
pub mod tui;
