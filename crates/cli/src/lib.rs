pub mod script;
pub mod source;
pub mod tui;
pub mod util;
