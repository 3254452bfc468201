use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

use paginator::{Paginator, PaginatorConfig};

mod cli;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug paginator book.txt
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        // Логируем ошибку и выходим с кодом 1.
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse()?;
    cli::validate_input(&cli.input)?;

    let cfg = PaginatorConfig::default();
    let output = cfg.output_path.clone();
    let summary = Paginator::new(cfg).run(&cli.input)?;

    println!(
        "File is ready: {} page(s) in {}",
        summary.pages,
        output.display()
    );
    Ok(())
}
