//! CLI: 引数解析と表示の整形

pub mod args;
pub mod present;

pub use args::{long_help, parse_args, print_completion, Config, ParseOutcome};
