use anyhow::Context;
use temacs::config::EditorConfig;
use temacs::{logging, Editor, Tui};

fn main() -> anyhow::Result<()> {
    logging::init();

    let file_arg = parse_args(&std::env::args().skip(1).collect::<Vec<_>>())?;
    let config = EditorConfig::load();

    let mut editor =
        Editor::new(file_arg.as_deref(), &config).context("failed to open file")?;
    let mut tui = Tui::new().context("failed to initialize terminal")?;
    editor.run(&mut tui).context("editor loop failed")?;
    Ok(())
}

/// コマンドライン引数を解釈する。受け付けるのはファイル名1つだけ。
fn parse_args(args: &[String]) -> anyhow::Result<Option<String>> {
    match args {
        [] => Ok(None),
        [arg] if arg == "--version" => {
            println!("temacs {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        [arg] if arg == "--help" => {
            println!("usage: temacs [FILE]");
            std::process::exit(0);
        }
        [file] => Ok(Some(file.clone())),
        _ => anyhow::bail!("usage: temacs [FILE]"),
    }
}
