use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tal",
    about = "Trust Anchor Ledger: vehicle, metadata, and trust anchor records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store snapshot file. Created on first write.
    #[arg(long, global = true, default_value = "tal-store.json")]
    pub store: PathBuf,

    /// Record book configuration (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoke a contract function
    Invoke(InvokeArgs),
    /// Create the store snapshot file
    Init(InitArgs),
    /// Print every stored key and value
    Dump(DumpArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct InvokeArgs {
    /// Function name, e.g. queryCar or storeTalList
    pub function: String,
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Also write the fixture records
    #[arg(long)]
    pub seed: bool,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Only keys starting with this prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_invoke() {
        let cli = Cli::try_parse_from(["tal", "invoke", "createCar", "CAR0", "Toyota", "Prius", "blue", "Tomoko"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.function, "createCar");
            assert_eq!(args.args.len(), 5);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_invoke_without_args() {
        let cli = Cli::try_parse_from(["tal", "invoke", "queryAllCars"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert!(args.args.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_init_seed() {
        let cli = Cli::try_parse_from(["tal", "init", "--seed"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(args.seed);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_store_and_config() {
        let cli = Cli::try_parse_from(["tal", "dump", "--store", "/tmp/s.json", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("/tmp/s.json"));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Command::Dump(_)));
    }

    #[test]
    fn store_has_default() {
        let cli = Cli::try_parse_from(["tal", "config"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("tal-store.json"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["tal", "--verbose", "init"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["tal", "--format", "json", "dump"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
