mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io::Read;
use std::process;

use cli::present;
use cli::{long_help, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::DiaryCommand;
use ports::inbound::UseCaseRunner;
use wiring::{wire_diary, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    /// 標準入力を全部読む
    fn read_stdin() -> Result<String, Error> {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| Error::invalid_argument(format!("標準入力を読めませんでした: {}", e)))?;
        Ok(buf)
    }

    fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(value).map_err(|e| Error::parse(e.to_string()))?;
        println!("{}", text);
        Ok(())
    }

    fn dispatch(&self, cmd: DiaryCommand) -> Result<i32, Error> {
        let uc = &self.app.use_case;
        match cmd {
            DiaryCommand::Help => {
                println!("{}", long_help());
                Ok(0)
            }
            DiaryCommand::Add(request) => {
                let content = match &request.content {
                    Some(c) => c.clone(),
                    None => Self::read_stdin()?,
                };
                let outcome = uc.add(request, &content)?;
                println!("保存しました: {}", outcome.entry.id);
                if outcome.entry.has_interpretation() {
                    println!();
                    println!("{}", present::entry_detail(&outcome.entry, uc.now_ms()));
                }
                for warning in &outcome.warnings {
                    eprintln!("diary: {}", warning);
                }
                Ok(0)
            }
            DiaryCommand::List { filter, limit, json } => {
                let entries = uc.list(&filter, limit)?;
                if json {
                    Self::print_json(&entries)?;
                } else if entries.is_empty() {
                    println!("まだ夢の記録がありません");
                } else {
                    for e in &entries {
                        println!("{}", present::entry_line(e));
                    }
                }
                Ok(0)
            }
            DiaryCommand::Show { id, json } => {
                let entry = uc.show(&id)?;
                if json {
                    Self::print_json(&entry)?;
                } else {
                    println!("{}", present::entry_detail(&entry, uc.now_ms()));
                }
                Ok(0)
            }
            DiaryCommand::Interpret { id } => {
                let entry = uc.interpret(&id)?;
                println!("{}", present::entry_detail(&entry, uc.now_ms()));
                Ok(0)
            }
            DiaryCommand::Image { id, prompt } => {
                let entry = uc.generate_image(&id, prompt.as_deref())?;
                println!("画像を生成しました: {}", entry.id);
                Ok(0)
            }
            DiaryCommand::SaveImage { id, path } => {
                let written = uc.save_image(&id, &path)?;
                println!("{} に書き出しました（{} bytes）", path.display(), written);
                Ok(0)
            }
            DiaryCommand::Delete { id } => {
                if uc.delete(&id)? {
                    println!("削除しました: {}", id);
                } else {
                    println!("該当する夢はありません: {}", id);
                }
                Ok(0)
            }
            DiaryCommand::Stats { json } => {
                let stats = uc.stats()?;
                if json {
                    Self::print_json(&stats)?;
                } else {
                    println!("{}", present::stats_text(&stats));
                }
                Ok(0)
            }
            DiaryCommand::SettingsShow => {
                println!("{}", present::settings_text(&uc.settings()?));
                Ok(0)
            }
            DiaryCommand::SettingsSet(patch) => {
                let saved = uc.update_settings(&patch)?;
                println!("{}", present::settings_text(&saved));
                Ok(0)
            }
            DiaryCommand::Models { provider } => {
                let settings = uc.settings()?;
                let providers = match provider {
                    Some(p) => vec![p],
                    None => common::domain::TextProvider::ALL.to_vec(),
                };
                println!("{}", present::models_text(&providers, &settings));
                Ok(0)
            }
            DiaryCommand::Export { output } => {
                let text = uc.export()?;
                match output {
                    Some(path) => {
                        self.app.fs.write(&path, &text)?;
                        println!("{} に書き出しました", path.display());
                    }
                    None => println!("{}", text),
                }
                Ok(0)
            }
            DiaryCommand::Import { input } => {
                let text = match input {
                    Some(path) => self.app.fs.read_to_string(&path)?,
                    None => Self::read_stdin()?,
                };
                let summary = uc.import(&text)?;
                println!("{}", present::import_text(&summary));
                Ok(0)
            }
            DiaryCommand::Clear { yes } => {
                uc.clear(yes)?;
                println!("すべてのデータを消去しました");
                Ok(0)
            }
        }
    }
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config.command;
        let command_name = cmd.name();
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name),
        );

        let result = self.dispatch(cmd);

        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error")
                    .field("error_kind", e.kind()),
            );
        }
        result
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("diary: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
        ParseOutcome::Help(text) => {
            print!("{}", text);
            return Ok(0);
        }
    };
    let app = wire_diary(config.home.as_deref(), config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: diary [--home <dir>] [-v] <command> [args...]  (diary --help)");
}
