use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::TransactionKind;
use crate::core::lookup::Terrain;

#[derive(Parser, Debug)]
#[command(
    name = "estimator",
    version,
    about = "Single-purpose cost, dose and quantity estimators (title insurance, rucking, lenses, sales tax)"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Print the raw result as JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API.
    Serve(ServerConfig),
    /// Title insurance premium from the tiered rate schedule.
    Title {
        #[arg(long, help = "Purchase price or loan amount in dollars")]
        price: f64,
        #[arg(long, value_enum, default_value_t = CliTransactionKind::Sale)]
        transaction: CliTransactionKind,
        #[arg(long, default_value_t = false, help = "Add 10% enhanced coverage")]
        enhanced: bool,
    },
    /// Calories burned rucking (corrected Pandolf equation).
    Ruck {
        #[arg(long, help = "Body weight in pounds")]
        body_weight: f64,
        #[arg(long, help = "Pack weight in pounds")]
        load: f64,
        #[arg(long, default_value_t = 15.0, help = "Pace in minutes per mile")]
        pace: f64,
        #[arg(long, default_value_t = 0.0, help = "Grade in percent")]
        grade: f64,
        #[arg(long, value_enum, default_value_t = CliTerrain::Paved)]
        terrain: CliTerrain,
        #[arg(long, default_value_t = 60.0, help = "Duration in minutes")]
        duration: f64,
    },
    /// Lens centre and edge thickness (sagitta formula).
    Lens {
        #[arg(long, allow_hyphen_values = true, help = "Prescription power in diopters")]
        power: f64,
        #[arg(long, default_value_t = 1.5)]
        index: f64,
        #[arg(long, default_value_t = 52.0, help = "Frame lens width (eye size) in mm")]
        lens_width: f64,
        #[arg(long, default_value_t = 70.0, help = "Frame PD in mm")]
        frame_pd: f64,
        #[arg(long, default_value_t = 64.0, help = "Pupillary distance in mm")]
        pd: f64,
        #[arg(long, default_value_t = false, help = "Compare every lens index")]
        compare: bool,
    },
    /// Pre-tax price and tax from a tax-inclusive total.
    SalesTax {
        #[arg(long)]
        total: f64,
        #[arg(long, help = "Tax rate in percent")]
        rate: Option<f64>,
        #[arg(long, help = "Two-letter state code; used when --rate is absent")]
        state: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    #[arg(long, env = "ESTIMATOR_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    #[arg(long, env = "ESTIMATOR_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTransactionKind {
    Sale,
    Refinance,
}

impl From<CliTransactionKind> for TransactionKind {
    fn from(value: CliTransactionKind) -> Self {
        match value {
            CliTransactionKind::Sale => TransactionKind::Sale,
            CliTransactionKind::Refinance => TransactionKind::Refinance,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliTerrain {
    Paved,
    DirtRoad,
    LightBrush,
    HardSnow,
    HeavyBrush,
    Swamp,
    LooseSand,
}

impl From<CliTerrain> for Terrain {
    fn from(value: CliTerrain) -> Self {
        match value {
            CliTerrain::Paved => Terrain::Paved,
            CliTerrain::DirtRoad => Terrain::DirtRoad,
            CliTerrain::LightBrush => Terrain::LightBrush,
            CliTerrain::HardSnow => Terrain::HardSnow,
            CliTerrain::HeavyBrush => Terrain::HeavyBrush,
            CliTerrain::Swamp => Terrain::Swamp,
            CliTerrain::LooseSand => Terrain::LooseSand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults_to_all_interfaces_on_8080() {
        let cli = Cli::try_parse_from(["estimator", "serve"]).expect("parse");
        let Command::Serve(config) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr(), ServerConfig::default().socket_addr());
    }

    #[test]
    fn lens_accepts_negative_power() {
        let cli = Cli::try_parse_from(["estimator", "lens", "--power", "-4.5", "--compare"])
            .expect("parse");
        match cli.command {
            Command::Lens { power, compare, .. } => {
                assert_eq!(power, -4.5);
                assert!(compare);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn terrain_value_enum_maps_to_lookup() {
        let cli = Cli::try_parse_from([
            "estimator",
            "ruck",
            "--body-weight",
            "180",
            "--load",
            "35",
            "--terrain",
            "loose-sand",
        ])
        .expect("parse");
        match cli.command {
            Command::Ruck { terrain, .. } => {
                assert_eq!(Terrain::from(terrain).coefficient(), 2.1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
