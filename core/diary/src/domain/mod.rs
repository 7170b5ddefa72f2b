//! diary コマンドのドメイン型

pub mod command;

pub use command::{AddRequest, DiaryCommand};
