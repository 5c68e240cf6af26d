use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use tokio::task::JoinHandle;
use weather_core::{ApiRepository, Config, WeatherViewModel};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and the default city.
    Configure,

    /// Current weather and forecast for a city.
    City {
        /// City name; the configured default city if absent.
        name: Option<String>,
    },

    /// Current weather and forecast for a position.
    Coords {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Search cities from a prompt until an empty line is entered.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        tracing::debug!(command = ?self.command, default_city = %config.default_city, "starting");

        match self.command {
            Command::Configure => configure(config),
            Command::City { name } => {
                let vm = view_model(&config)?;
                let city = name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| config.default_city.clone());

                drive(&vm, vm.spawn_search_by_city_name(city)).await?;
                finish(&vm)
            }
            Command::Coords { lat, lon } => {
                let vm = view_model(&config)?;
                drive(&vm, vm.spawn_locate(lat, lon)).await?;
                finish(&vm)
            }
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn view_model(config: &Config) -> anyhow::Result<WeatherViewModel> {
    let repository = ApiRepository::new(config.client()?);
    Ok(WeatherViewModel::with_dates(Arc::new(repository), config.date_formatter()))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = city.trim().to_string();
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Waits for `task`, printing a progress marker while the view model reports
/// a request in flight.
async fn drive<T>(vm: &WeatherViewModel, mut task: JoinHandle<T>) -> anyhow::Result<T> {
    let mut updates = vm.subscribe();

    loop {
        tokio::select! {
            joined = &mut task => {
                eprintln!();
                return joined.context("Weather request task failed");
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return (&mut task).await.context("Weather request task failed");
                }
                if updates.borrow_and_update().loading {
                    eprint!(".");
                }
            }
        }
    }
}

fn finish(vm: &WeatherViewModel) -> anyhow::Result<()> {
    let state = vm.state();
    print!("{}", render(&state));

    if state.error {
        anyhow::bail!("weather request failed");
    }
    Ok(())
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let vm = view_model(config)?;

    loop {
        let city = Text::new("City:")
            .with_help_message("empty input quits")
            .prompt()
            .context("Failed to read city")?;
        let city = city.trim();
        if city.is_empty() {
            return Ok(());
        }

        drive(&vm, vm.spawn_search_by_city_name(city)).await?;
        print!("{}", render(&vm.state()));

        while vm.state().error {
            let retry = Confirm::new("Retry?").with_default(true).prompt()?;
            if !retry {
                break;
            }
            drive(&vm, vm.spawn_retry()).await?;
            print!("{}", render(&vm.state()));
        }
    }
}
