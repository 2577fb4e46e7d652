use std::net::{IpAddr, SocketAddr};

use calcs::api::{
    self, AnnuityPayload, CompoundPayload, GoalPayload, HeartRatePayload, InflationPayload,
    PresentValuePayload, ProjectionPayload, RecurringDepositPayload,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "calcs",
    about = "Financial and health calculators over a shared projection engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Serve the calculators as a JSON HTTP API")]
    Serve {
        #[arg(long, env = "CALCS_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "CALCS_PORT", default_value_t = 8080)]
        port: u16,
    },
    #[command(about = "Fixed deposit / lump-sum compound maturity")]
    Compound(CompoundPayload),
    #[command(about = "Recurring deposit maturity")]
    RecurringDeposit(RecurringDepositPayload),
    #[command(about = "Future value of a payment stream")]
    Annuity(AnnuityPayload),
    #[command(about = "Present value of a lump sum, annuity or perpetuity")]
    PresentValue(PresentValuePayload),
    #[command(about = "Inflation-adjusted amount from a custom or historical rate")]
    Inflation(InflationPayload),
    #[command(about = "Investment growth with a yearly breakdown")]
    Project(ProjectionPayload),
    #[command(about = "Solve for the contribution or rate that reaches a target balance")]
    Goal(GoalPayload),
    #[command(about = "Karvonen target heart-rate zones")]
    HeartRate(HeartRatePayload),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calcs=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rendered = match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = api::run_http_server(SocketAddr::new(host, port)).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
            return;
        }
        Command::Compound(args) => api::render_json(args),
        Command::RecurringDeposit(args) => api::render_json(args),
        Command::Annuity(args) => api::render_json(args),
        Command::PresentValue(args) => api::render_json(args),
        Command::Inflation(args) => api::render_json(args),
        Command::Project(args) => api::render_json(args),
        Command::Goal(args) => api::render_json(args),
        Command::HeartRate(args) => api::render_json(args),
    };

    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
