use crate::demo::{run_demo, run_lender_recommend, DemoArgs, LenderRecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Education Loan Intake Orchestrator",
    about = "Demonstrate and run the education-loan intake portal from the command line",
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
    /// Rank the lender catalog for an applicant profile without serving
    Lenders {
        #[command(subcommand)]
        command: LenderCommand,
    },
    /// Run an end-to-end CLI demo covering the intake wizard and lender matching
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LenderCommand {
    /// Split the catalog into domestic and foreign lenders with estimates
    Recommend(LenderRecommendArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Lenders {
            command: LenderCommand::Recommend(args),
        } => run_lender_recommend(args),
        Command::Demo(args) => run_demo(args),
    }
}
