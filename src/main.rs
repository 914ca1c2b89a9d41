use std::process::ExitCode;

use clap::Parser;
use encoding_rs::UTF_8;

use xsdgen::cli::Cli;
use xsdgen::generator::{format_source, CodeGenerator};
use xsdgen::{parse_document, Error};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("xsdgen: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let raw = std::fs::read(&cli.input)?;
    let (text, _, _) = UTF_8.decode(&raw);

    let options = roxmltree::ParsingOptions {
        allow_dtd: cli.allow_dtd,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(&text, options)?;

    let tree = parse_document(&doc, cli.lang)?;
    let mut generator = CodeGenerator::new(cli.lang, &cli.package, &cli.output, cli.omit_xmlname, &tree);
    let source = generator.generate();

    // A formatter rejection still leaves the unformatted text on disk so the
    // caller can inspect what was produced.
    match format_source(&source) {
        Ok(formatted) => std::fs::write(&cli.output, formatted)?,
        Err(err) => {
            std::fs::write(&cli.output, &source)?;
            return Err(err);
        }
    }
    Ok(())
}
