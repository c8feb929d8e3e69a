use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use platescan::{exit, exit_code, BatchRecord, Cli, PdfProcessor, ProcessError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "platescan=info" } else { "platescan=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            println!("Unexpected error: {e:#}");
            ExitCode::from(exit::FAILURE)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let processor = cli.build_processor()?;
    match cli.files.as_slice() {
        [file] => Ok(run_single(cli, &processor, file)),
        files => run_batch(cli, &processor, files),
    }
}

fn run_single(cli: &Cli, processor: &PdfProcessor, file: &std::path::Path) -> u8 {
    let outcome = if cli.json {
        processor.process(file).map_err(ProcessError::from).and_then(|result| {
            println!("{}", serde_json::to_string_pretty(&result).map_err(io::Error::from)?);
            Ok(result)
        })
    } else {
        processor.process_pdf(file, cli.show_preview())
    };

    match &outcome {
        Err(e) if e.is_not_found() => println!("Error: {e}"),
        Err(e) => println!("Unexpected error: {e}"),
        Ok(_) => {}
    }
    exit_code(&outcome)
}

fn run_batch(cli: &Cli, processor: &PdfProcessor, files: &[std::path::PathBuf]) -> anyhow::Result<u8> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = if cli.json {
        let summary = processor.process_batch_silent(files);
        let records: Vec<BatchRecord<'_>> = summary.records();
        serde_json::to_writer_pretty(&mut out, &records)?;
        writeln!(out)?;
        summary
    } else {
        let summary = processor.process_batch(files, cli.show_preview(), &mut out);
        summary.write_report(&mut out)?;
        summary
    };
    Ok(summary.exit_code())
}
