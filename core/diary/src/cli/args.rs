use crate::domain::{AddRequest, DiaryCommand};
use chrono::NaiveDate;
use clap::builder::ArgAction;
use clap::error::ErrorKind;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::{
    DreamTag, EntryId, GeminiImageModel, ImageProvider, SettingsPatch, TextProvider, Theme,
};
use common::error::Error;
use common::search::EntryFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// --home: データディレクトリ（DIARY_HOME 等より優先）
    pub home: Option<PathBuf>,
    /// -v / --verbose: ログを stderr にも出す
    pub verbose: bool,
    pub command: DiaryCommand,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: None,
            verbose: false,
            command: DiaryCommand::Help,
        }
    }
}

/// 解析結果: 通常の Config / 補完スクリプト生成 / clap が組み立てたヘルプ表示
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
    /// --help / --version（表示する文字列）
    Help(String),
}

fn id_arg() -> clap::Arg {
    clap::Arg::new("id")
        .value_name("id")
        .help("Entry id (see `diary list`)")
        .required(true)
}

fn tag_arg(help: &'static str) -> clap::Arg {
    clap::Arg::new("tag")
        .short('t')
        .long("tag")
        .value_name("tag")
        .help(help)
        .action(ArgAction::Append)
}

fn json_arg() -> clap::Arg {
    clap::Arg::new("json")
        .long("json")
        .help("Print as JSON")
        .action(ArgAction::SetTrue)
}

pub(crate) fn build_clap_command() -> clap::Command {
    clap::Command::new("diary")
        .about("Dream diary with AI interpretation and illustration")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("home")
                .long("home")
                .value_name("dir")
                .help("Data directory (overrides DIARY_HOME)")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also print logs to stderr")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(
            clap::Command::new("add")
                .about("Record a dream")
                .arg(
                    clap::Arg::new("date")
                        .short('d')
                        .long("date")
                        .value_name("YYYY-MM-DD")
                        .help("Date of the dream (default: today)"),
                )
                .arg(tag_arg("Tag (楽しい, 怖い, 不思議, 懐かしい, 予知夢, 悪夢, 明晰夢, その他); repeatable"))
                .arg(
                    clap::Arg::new("interpret")
                        .short('i')
                        .long("interpret")
                        .help("Interpret the dream with the configured AI before saving")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("image")
                        .long("image")
                        .help("Also generate an illustration (implies --interpret)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("content")
                        .help("Dream content (read from stdin when omitted)")
                        .num_args(0..)
                        .trailing_var_arg(true),
                ),
        )
        .subcommand(
            clap::Command::new("list")
                .about("List dreams, newest first")
                .arg(
                    clap::Arg::new("query")
                        .short('q')
                        .long("query")
                        .value_name("text")
                        .help("Search content, interpretation and keywords"),
                )
                .arg(tag_arg("Only dreams with any of these tags; repeatable"))
                .arg(
                    clap::Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("n")
                        .value_parser(value_parser!(usize)),
                )
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new("show")
                .about("Show one dream")
                .arg(id_arg())
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new("interpret")
                .about("Interpret a saved dream with the configured AI")
                .arg(id_arg()),
        )
        .subcommand(
            clap::Command::new("image")
                .about("Generate an illustration for a saved dream")
                .arg(id_arg())
                .arg(
                    clap::Arg::new("prompt")
                        .short('p')
                        .long("prompt")
                        .value_name("text")
                        .help("Use this prompt instead of the saved image prompt"),
                ),
        )
        .subcommand(
            clap::Command::new("save-image")
                .about("Write a dream's illustration to a file")
                .arg(id_arg())
                .arg(
                    clap::Arg::new("path")
                        .value_name("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("delete")
                .about("Delete a dream")
                .arg(id_arg()),
        )
        .subcommand(
            clap::Command::new("stats")
                .about("Show statistics")
                .arg(json_arg()),
        )
        .subcommand(
            clap::Command::new("settings")
                .about("Show or change settings")
                .subcommand(clap::Command::new("show").about("Show current settings"))
                .subcommand(
                    clap::Command::new("set")
                        .about("Change settings (only the given fields)")
                        .arg(
                            clap::Arg::new("text-provider")
                                .long("text-provider")
                                .value_name("openai|anthropic|gemini")
                                .help("Interpretation provider (resets the model unless --text-model is given)"),
                        )
                        .arg(clap::Arg::new("text-key").long("text-key").value_name("key"))
                        .arg(clap::Arg::new("text-model").long("text-model").value_name("model"))
                        .arg(
                            clap::Arg::new("image-provider")
                                .long("image-provider")
                                .value_name("openai|stability|gemini"),
                        )
                        .arg(clap::Arg::new("image-key").long("image-key").value_name("key"))
                        .arg(
                            clap::Arg::new("gemini-image-model")
                                .long("gemini-image-model")
                                .value_name("model"),
                        )
                        .arg(
                            clap::Arg::new("theme")
                                .long("theme")
                                .value_name("light|dark|system"),
                        ),
                ),
        )
        .subcommand(
            clap::Command::new("models")
                .about("List known interpretation models")
                .arg(
                    clap::Arg::new("provider")
                        .long("provider")
                        .value_name("openai|anthropic|gemini"),
                ),
        )
        .subcommand(
            clap::Command::new("export")
                .about("Export entries and settings as JSON")
                .arg(
                    clap::Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("path")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("import")
                .about("Import an exported JSON file (replaces entries/settings it contains)")
                .arg(
                    clap::Arg::new("input")
                        .value_name("path")
                        .help("File to import (stdin when omitted)")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("clear")
                .about("Erase all entries and settings")
                .arg(
                    clap::Arg::new("yes")
                        .long("yes")
                        .help("Confirm erasing everything")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn parse_tags(matches: &clap::ArgMatches) -> Result<Vec<DreamTag>, Error> {
    matches
        .get_many::<String>("tag")
        .map(|vals| vals.map(|s| parse_tag(s)).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

fn parse_tag(s: &str) -> Result<DreamTag, Error> {
    DreamTag::parse(s).ok_or_else(|| {
        let names: Vec<&str> = DreamTag::ALL.iter().map(|t| t.as_str()).collect();
        Error::invalid_argument(format!(
            "不明なタグです: {}（使えるタグ: {}）",
            s,
            names.join(", ")
        ))
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        Error::invalid_argument(format!("日付は YYYY-MM-DD 形式で指定してください: {}", s))
    })
}

fn parse_text_provider(s: &str) -> Result<TextProvider, Error> {
    TextProvider::parse(s).ok_or_else(|| Error::unsupported_provider(s))
}

fn entry_id(matches: &clap::ArgMatches) -> EntryId {
    matches
        .get_one::<String>("id")
        .map(|s| EntryId::new(s.trim()))
        .unwrap_or_else(|| EntryId::new(""))
}

fn settings_patch(matches: &clap::ArgMatches) -> Result<SettingsPatch, Error> {
    let get = |name: &str| matches.get_one::<String>(name).cloned();
    let mut patch = SettingsPatch::default();
    if let Some(p) = get("text-provider") {
        patch = patch.switch_text_provider(parse_text_provider(&p)?);
    }
    if let Some(k) = get("text-key") {
        patch.text_api_key = Some(k.trim().to_string());
    }
    if let Some(m) = get("text-model") {
        patch.text_model = Some(m.trim().to_string());
    }
    if let Some(p) = get("image-provider") {
        patch.image_api_provider =
            Some(ImageProvider::parse(&p).ok_or_else(|| Error::unsupported_provider(p.clone()))?);
    }
    if let Some(k) = get("image-key") {
        patch.image_api_key = Some(k.trim().to_string());
    }
    if let Some(m) = get("gemini-image-model") {
        patch.gemini_image_model = Some(GeminiImageModel::parse(&m).ok_or_else(|| {
            Error::invalid_argument(format!(
                "不明な Gemini 画像モデルです: {}（{} / {}）",
                m,
                GeminiImageModel::Flash25,
                GeminiImageModel::Pro3Preview
            ))
        })?);
    }
    if let Some(t) = get("theme") {
        patch.theme = Some(Theme::parse(&t).ok_or_else(|| {
            Error::invalid_argument(format!("テーマは light / dark / system のいずれかです: {}", t))
        })?);
    }
    Ok(patch)
}

fn subcommand_to_command(name: &str, sub: &clap::ArgMatches) -> Result<DiaryCommand, Error> {
    let json = || sub.try_get_one::<bool>("json").ok().flatten().copied().unwrap_or(false);
    let command = match name {
        "add" => {
            let words: Vec<String> = sub
                .get_many::<String>("content")
                .map(|i| i.cloned().collect())
                .unwrap_or_default();
            let image = sub.get_flag("image");
            DiaryCommand::Add(AddRequest {
                date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
                tags: parse_tags(sub)?,
                content: if words.is_empty() { None } else { Some(words.join(" ")) },
                interpret: sub.get_flag("interpret") || image,
                image,
            })
        }
        "list" => DiaryCommand::List {
            filter: EntryFilter::new(
                sub.get_one::<String>("query").cloned().unwrap_or_default(),
                parse_tags(sub)?,
            ),
            limit: sub.get_one::<usize>("limit").copied(),
            json: json(),
        },
        "show" => DiaryCommand::Show {
            id: entry_id(sub),
            json: json(),
        },
        "interpret" => DiaryCommand::Interpret { id: entry_id(sub) },
        "image" => DiaryCommand::Image {
            id: entry_id(sub),
            prompt: sub.get_one::<String>("prompt").cloned(),
        },
        "save-image" => DiaryCommand::SaveImage {
            id: entry_id(sub),
            path: sub.get_one::<PathBuf>("path").cloned().unwrap_or_default(),
        },
        "delete" => DiaryCommand::Delete { id: entry_id(sub) },
        "stats" => DiaryCommand::Stats { json: json() },
        "settings" => match sub.subcommand() {
            Some(("set", set)) => DiaryCommand::SettingsSet(settings_patch(set)?),
            _ => DiaryCommand::SettingsShow,
        },
        "models" => DiaryCommand::Models {
            provider: sub
                .get_one::<String>("provider")
                .map(|s| parse_text_provider(s))
                .transpose()?,
        },
        "export" => DiaryCommand::Export {
            output: sub.get_one::<PathBuf>("output").cloned(),
        },
        "import" => DiaryCommand::Import {
            input: sub.get_one::<PathBuf>("input").cloned(),
        },
        "clear" => DiaryCommand::Clear {
            yes: sub.get_flag("yes"),
        },
        other => {
            return Err(Error::invalid_argument(format!("unknown command: {}", other)));
        }
    };
    Ok(command)
}

fn matches_to_config(matches: &clap::ArgMatches) -> Result<Config, Error> {
    let home = matches.get_one::<PathBuf>("home").cloned();
    let verbose = matches.get_flag("verbose");
    let command = match matches.subcommand() {
        Some((name, sub)) => subcommand_to_command(name, sub)?,
        None => DiaryCommand::Help,
    };
    Ok(Config {
        home,
        verbose,
        command,
    })
}

fn clap_error(e: clap::Error) -> Result<ParseOutcome, Error> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(ParseOutcome::Help(e.to_string())),
        _ => Err(Error::invalid_argument(e.to_string())),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    parse_outcome(build_clap_command().try_get_matches())
}

/// 引数スライスから解析する（テスト・埋め込み用）
pub fn parse_args_from(args: &[String]) -> Result<ParseOutcome, Error> {
    parse_outcome(build_clap_command().try_get_matches_from(args))
}

fn parse_outcome(matches: Result<clap::ArgMatches, clap::Error>) -> Result<ParseOutcome, Error> {
    let matches = match matches {
        Ok(m) => m,
        Err(e) => return clap_error(e),
    };
    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)?))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "diary", &mut std::io::stdout());
}

/// 全体のヘルプ文
pub fn long_help() -> String {
    build_clap_command().render_long_help().to_string()
}
