use crate::demo::{run_demo, run_ingest, DemoArgs, IngestArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_engine::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Engine",
    about = "Run the credit scoring and loan eligibility service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate customer and loan exports and print an import summary
    Ingest(IngestArgs),
    /// Walk through registration, eligibility and loan creation against in-memory data
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Customer export loaded before the server starts
    #[arg(long)]
    pub(crate) customers_csv: Option<PathBuf>,
    /// Loan history export loaded after the customers
    #[arg(long)]
    pub(crate) loans_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ingest(args) => run_ingest(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional_and_accepts_seed_paths() {
        let cli = Cli::try_parse_from(["credit-engine-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "credit-engine-api",
            "serve",
            "--port",
            "8080",
            "--customers-csv",
            "customer_data.csv",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.customers_csv, Some(PathBuf::from("customer_data.csv")));
                assert!(args.loans_csv.is_none());
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn ingest_requires_a_customer_export() {
        assert!(Cli::try_parse_from(["credit-engine-api", "ingest"]).is_err());
        let cli = Cli::try_parse_from([
            "credit-engine-api",
            "ingest",
            "--customers-csv",
            "c.csv",
            "--loans-csv",
            "l.csv",
        ])
        .expect("parses");
        assert!(matches!(cli.command, Some(Command::Ingest(_))));
    }
}
