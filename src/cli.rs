use clap::{Parser, ValueEnum};

/// Target language of the emitted declarations. The language selects the
/// built-in type registry and the emission rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Language {
    Go,
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    /// Package name of the generated source file
    #[clap(short, long, default_value = "")]
    pub package: String,

    /// The input XML schema document
    #[clap(short, long)]
    pub input: String,

    /// Path of the generated source file
    #[clap(short, long)]
    pub output: String,

    /// The target language to emit
    #[clap(short, long, default_value = "go", value_enum)]
    pub lang: Language,

    /// Suppress the XMLName field on structs whose emitted identifier
    /// differs from the schema name
    #[clap(long)]
    pub omit_xmlname: bool,

    /// Allow a XML Document Type Definition (DTD) to occur
    #[clap(long)]
    pub allow_dtd: bool,
}
