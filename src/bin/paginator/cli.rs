use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Paginator: word-wrapped 80x25 pages with a binary page trailer
#[derive(Parser, Debug)]
#[command(
    name = "paginator",
    version,
    about = "Reflow a file into fixed-size pages (written to output.txt)"
)]
pub struct Cli {
    /// Input file to paginate
    pub input: PathBuf,
}

impl Cli {
    /// Разбор аргументов. `--help`/`--version` завершают процесс как обычно;
    /// прочие ошибки — usage в stdout и ошибка clap наверх (фатально).
    pub fn parse() -> Result<Self> {
        Self::parse_from(std::env::args_os())
    }

    pub fn parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match <Cli as Parser>::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                print_usage();
                Err(anyhow::Error::new(e).context("invalid arguments"))
            }
        }
    }
}

pub fn print_usage() {
    println!("{}", Cli::command().render_usage());
}

/// Файл существует, это не каталог, и его можно открыть на чтение.
pub fn validate_input(path: &Path) -> Result<()> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            print_usage();
            println!(
                "File {} not found. Please, provide a valid filename",
                path.display()
            );
            return Err(e).with_context(|| format!("stat {}", path.display()));
        }
    };
    if meta.is_dir() {
        print_usage();
        println!("{} is a directory. Please, provide a regular file", path.display());
        return Err(anyhow!("input {} is a directory", path.display()));
    }
    if let Err(e) = File::open(path) {
        print_usage();
        println!(
            "File {} could not be opened. Please, check permissions",
            path.display()
        );
        return Err(e).with_context(|| format!("open {}", path.display()));
    }
    Ok(())
}
