mod cmd;

use {
    clap::{arg, ArgMatches, Command},
    cmd::Error as ExecutionError,
    snafu::prelude::*,
    std::{env, io, path::PathBuf, process},
    tracing_subscriber::EnvFilter,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("the `DICTOOL_DATADIR` environment variable is unset, you can pass a argument with `-d` to config"))]
    NoDataDirectory,

    ExecuteCommand {
        #[snafu(backtrace)]
        source: ExecutionError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

const DICTOOL_DATADIR: &str = "DICTOOL_DATADIR";

const INIT_DATABASE: &str = "initdb";
const SHOW_DATABASE: &str = "show";
const UPGRADE_DATABASE: &str = "upgrade";

fn cli() -> Command {
    let pkg_name = env!("CARGO_PKG_NAME");
    let data_dir = || arg!(-d --data_dir [PATH] "data directory");

    Command::new(pkg_name)
        .bin_name(pkg_name)
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .subcommand(
            Command::new(INIT_DATABASE)
                .about("initialize the data directory")
                .arg(data_dir())
                .arg(arg!(-o --owner [USER] "database owner").default_value("APP")),
        )
        .subcommand(
            Command::new(SHOW_DATABASE)
                .about("list the schemas and tables of a database")
                .arg(data_dir()),
        )
        .subcommand(
            Command::new(UPGRADE_DATABASE)
                .about("upgrade the catalogs to the current version")
                .arg(data_dir()),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = try_main() {
        eprintln!("{}", err);
        process::exit(2);
    }
}

fn data_dir(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<String>("data_dir") {
        Some(dir) => Ok(dir.into()),
        None => env::var(DICTOOL_DATADIR)
            .map(PathBuf::from)
            .map_err(|_| Error::NoDataDirectory),
    }
}

fn try_main() -> Result<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some((INIT_DATABASE, sub_matches)) => {
            let owner = sub_matches
                .get_one::<String>("owner")
                .map(String::as_str)
                .unwrap_or("APP");
            let version = cmd::create_dictionary(&data_dir(sub_matches)?, owner)
                .context(ExecuteCommandSnafu)?;
            println!("created dictionary version {}", version);
        }
        Some((SHOW_DATABASE, sub_matches)) => {
            let summary = cmd::describe(&data_dir(sub_matches)?).context(ExecuteCommandSnafu)?;
            print!("{}", summary);
        }
        Some((UPGRADE_DATABASE, sub_matches)) => {
            let (before, after) = cmd::upgrade_dictionary(&data_dir(sub_matches)?)
                .context(ExecuteCommandSnafu)?;
            if before == after {
                println!("dictionary already at version {}", after);
            } else {
                println!("upgraded dictionary from {} to {}", before, after);
            }
        }
        _ => unreachable!(),
    }

    Ok(())
}
