use clap::builder::PossibleValuesParser;
use clap::Parser;

use crate::figures;

/// Render the mutation-age publication figures from pipeline result files.
///
/// Data and output locations come from `figures.toml` in the working
/// directory, or the file named by `MUTATION_AGE_FIGURES_CONFIG`.
#[derive(Debug, Parser)]
#[command(name = "plot", version, about)]
pub struct Args {
    /// Figure to draw, or `all` for every registered figure.
    #[arg(value_parser = figure_names())]
    pub name: String,
}

/// Registered figure names plus `all`.
fn figure_names() -> PossibleValuesParser {
    let mut names = figures::names();
    names.push(figures::ALL);
    PossibleValuesParser::new(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse() {
        let args = Args::try_parse_from(["plot", "scaling"]).unwrap();
        assert_eq!(args.name, "scaling");
        let args = Args::try_parse_from(["plot", "all"]).unwrap();
        assert_eq!(args.name, "all");
    }

    #[test]
    fn unknown_name_lists_choices() {
        let err = Args::try_parse_from(["plot", "vindija_descent"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(err.to_string().contains("tmrca_clustermap"));
    }

    #[test]
    fn name_is_required() {
        assert!(Args::try_parse_from(["plot"]).is_err());
    }
}
