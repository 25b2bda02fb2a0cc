pub mod arg_aliases;
pub mod suggest;
pub mod text;
pub mod time;
pub mod tool_errors;
