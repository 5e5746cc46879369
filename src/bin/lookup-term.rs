use anyhow::{Context, Result};
use clap::Parser;
use etox_extract::constants::NORMALISATION_FILE;
use etox_extract::output::read_dataset;
use etox_extract::NormalizationTable;
use std::path::PathBuf;

/// Resolve raw terms against a written normalisation table.
#[derive(Parser, Debug)]
#[command(name = "lookup-term", version, about = "Resolve verbatim terms to their canonical form")]
struct Cli {
    /// Directory holding the extracted datasets (usually `data`)
    data_dir: PathBuf,

    /// Terms to resolve
    #[arg(required = true)]
    terms: Vec<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let path = args.data_dir.join(NORMALISATION_FILE);
    let table: NormalizationTable = read_dataset(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let mut unresolved = 0;
    for term in &args.terms {
        match table.resolve(term) {
            Some(canonical) => println!("{term}\t{canonical}"),
            None => {
                unresolved += 1;
                println!("{term}\t?");
            }
        }
    }

    if unresolved > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_data_dir_comes_first() {
        let cli = Cli::try_parse_from(["lookup-term", "/tmp/out", "liver", "RATS"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.terms, vec!["liver", "RATS"]);
    }

    #[test]
    fn test_terms_are_required() {
        let err = Cli::try_parse_from(["lookup-term", "/tmp/out"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
