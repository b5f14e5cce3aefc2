//! `datavis` command-line tool

mod commands;
mod logging;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn post_arg() -> Arg {
    Arg::new("post")
        .long("post")
        .required(true)
        .value_parser(value_parser!(u64))
        .help("Host document ID")
}

fn filename_arg() -> Arg {
    Arg::new("filename")
        .required(true)
        .help("Dataset filename ([a-z0-9-_.]+)")
}

fn spec_arg() -> Arg {
    Arg::new("spec")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Chart specification JSON file")
}

fn cli() -> Command {
    Command::new("datavis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Chart datasets and specification tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Client configuration file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log as JSON lines"),
        )
        .subcommand(
            Command::new("datasets")
                .about("Manage the datasets of a document")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List datasets").arg(post_arg()))
                .subcommand(
                    Command::new("get")
                        .about("Show one dataset")
                        .arg(post_arg())
                        .arg(filename_arg())
                        .arg(
                            Arg::new("csv")
                                .long("csv")
                                .action(ArgAction::SetTrue)
                                .help("Print raw CSV content only"),
                        ),
                )
                .subcommand(
                    Command::new("put")
                        .about("Create or overwrite a dataset from a CSV file")
                        .arg(post_arg())
                        .arg(
                            Arg::new("file")
                                .required(true)
                                .value_parser(value_parser!(PathBuf))
                                .help("CSV file to upload"),
                        )
                        .arg(
                            Arg::new("filename")
                                .long("name")
                                .help("Dataset filename (defaults to data.csv)"),
                        ),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a dataset")
                        .arg(post_arg())
                        .arg(filename_arg()),
                ),
        )
        .subcommand(
            Command::new("spec")
                .about("Transform chart specifications")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transform")
                        .about("Migrate a spec to a chart type")
                        .arg(spec_arg())
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .required(true)
                                .value_parser(["xy", "radial"])
                                .help("Target chart type"),
                        ),
                )
                .subcommand(
                    Command::new("type")
                        .about("Print the chart type of a spec")
                        .arg(spec_arg()),
                )
                .subcommand(
                    Command::new("fields")
                        .about("Print field options sampled from a CSV file")
                        .arg(
                            Arg::new("csv")
                                .required(true)
                                .value_parser(value_parser!(PathBuf))
                                .help("CSV file"),
                        ),
                )
                .subcommand(
                    Command::new("bind")
                        .about("Bind a dataset column to a channel")
                        .arg(spec_arg())
                        .arg(
                            Arg::new("channel")
                                .long("channel")
                                .required(true)
                                .help("Encoding channel"),
                        )
                        .arg(
                            Arg::new("field")
                                .long("field")
                                .required(true)
                                .help("Column name, or none for color"),
                        )
                        .arg(
                            Arg::new("data")
                                .long("data")
                                .required(true)
                                .value_parser(value_parser!(PathBuf))
                                .help("CSV file providing the columns"),
                        ),
                )
                .subcommand(
                    Command::new("render")
                        .about("Render the page markup for a spec")
                        .arg(spec_arg())
                        .arg(
                            Arg::new("data")
                                .long("data")
                                .value_parser(value_parser!(PathBuf))
                                .help("Inline rows from a CSV file"),
                        )
                        .arg(
                            Arg::new("renderer")
                                .long("renderer")
                                .action(ArgAction::SetTrue)
                                .help("Print the renderer spec instead of markup"),
                        ),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("verbose"), matches.get_flag("log-json"));

    let output = match matches.subcommand() {
        Some(("datasets", args)) => {
            let config = commands::load_config(matches.get_one::<PathBuf>("config"))?;
            commands::datasets(config, args).await?
        }
        Some(("spec", args)) => commands::spec(args)?,
        _ => unreachable!("subcommand is required"),
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn cli_parses_nested_commands() {
        let matches = cli()
            .try_get_matches_from([
                "datavis",
                "-v",
                "datasets",
                "get",
                "--post",
                "42",
                "sales.csv",
                "--csv",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let (_, datasets) = matches.subcommand().unwrap();
        let (name, get) = datasets.subcommand().unwrap();
        assert_eq!(name, "get");
        assert_eq!(get.get_one::<u64>("post"), Some(&42));
        assert!(get.get_flag("csv"));

        assert!(cli()
            .try_get_matches_from(["datavis", "spec", "transform", "a.json", "--to", "pie"])
            .is_err());
    }
}
