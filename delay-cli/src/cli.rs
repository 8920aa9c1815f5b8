use anyhow::Context;
use chrono::{Duration, Local};
use clap::{Parser, Subcommand};
use delay_core::{
    AirportDirectory, Config, PredictionOutcome, PredictionReport, Predictor, TripInputs,
};
use inquire::{CustomType, Password, Select, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "delay", version, about = "Weather-aware flight delay prediction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set weather and scoring credentials.
    Configure,

    /// List the airports predictions can be made for.
    Airports,

    /// Predict whether a departure will be delayed. Missing values are prompted for.
    Predict {
        /// Origin airport code, e.g. "SEA".
        #[arg(long)]
        origin: Option<String>,

        /// Destination airport code.
        #[arg(long)]
        dest: Option<String>,

        /// Carrier code, e.g. "DL".
        #[arg(long)]
        carrier: Option<String>,

        /// Departure date, YYYY-MM-DD or M/D/YYYY.
        #[arg(long)]
        date: Option<String>,

        /// Departure hour, counted from midnight of the departure date.
        #[arg(long)]
        hour: Option<u32>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Airports => {
                for airport in AirportDirectory::default().airports() {
                    println!("{}  {}  ({})", airport.code, airport.state, airport.location_id);
                }
            }
            Command::Predict { origin, dest, carrier, date, hour } => {
                let config = Config::load()?;
                let predictor = Predictor::from_config(&config)?;
                let airports = predictor.directory();

                let trip = TripInputs {
                    origin: or_select(origin, "Origin airport:", airports)?,
                    dest: or_select(dest, "Destination airport:", airports)?,
                    carrier: match carrier {
                        Some(c) => c,
                        None => Text::new("Carrier code:").prompt()?,
                    },
                    date: match date {
                        Some(d) => d,
                        None => {
                            let default = (Local::now().date_naive() + Duration::days(5))
                                .format("%Y-%m-%d")
                                .to_string();
                            Text::new("Departure date:").with_default(&default).prompt()?
                        }
                    },
                    hour: match hour {
                        Some(h) => h,
                        None => CustomType::<u32>::new("Departure time (hours after midnight):")
                            .prompt()?,
                    }
                    .to_string(),
                };

                let report =
                    predictor.predict(&trip).await.context("Delay prediction did not complete")?;
                print!("{}", render_report(&report));
            }
        }

        Ok(())
    }
}

fn or_select(
    value: Option<String>,
    prompt: &str,
    airports: &AirportDirectory,
) -> anyhow::Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    let codes: Vec<String> = airports.airports().iter().map(|a| a.code.clone()).collect();
    Ok(Select::new(prompt, codes).prompt()?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let weather_key = Password::new("Weather API key (blank keeps current):")
        .without_confirmation()
        .prompt()?;
    keep_or_replace(&mut config.weather.api_key, weather_key);

    let scoring_key = Password::new("Scoring API key (blank keeps current):")
        .without_confirmation()
        .prompt()?;
    keep_or_replace(&mut config.scoring.api_key, scoring_key);

    for (label, slot) in [
        ("Scoring workspace id:", &mut config.scoring.workspace_id),
        ("Scoring service id:", &mut config.scoring.service_id),
        ("Scoring region:", &mut config.scoring.location),
    ] {
        let current = slot.clone().unwrap_or_default();
        let answer = Text::new(label).with_default(&current).prompt()?;
        keep_or_replace(slot, answer);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn keep_or_replace(slot: &mut Option<String>, answer: String) {
    let answer = answer.trim();
    if !answer.is_empty() {
        *slot = Some(answer.to_string());
    }
}

/// Human-readable summary of one prediction cycle.
pub fn render_report(report: &PredictionReport) -> String {
    let q = &report.query;
    let f = &report.forecast;

    let prediction = match &report.outcome {
        PredictionOutcome::NotConfigured => "(not configured)".to_string(),
        PredictionOutcome::Predicted(p) => format!(
            "{} (confidence {:.2}%)",
            if p.expect_delay { "expect delays" } else { "no delays expected" },
            p.confidence * 100.0
        ),
        PredictionOutcome::Unavailable(_) => "prediction unavailable".to_string(),
    };

    format!(
        "{} -> {} on {}, departing {}\n\
         Forecast: {} ({})\n  \
         wind {}, pressure {}, precipitation {}\n\
         Prediction: {prediction}\n",
        q.origin_code,
        q.dest_code,
        q.carrier,
        f.time,
        f.condition,
        f.icon_url,
        f.wind_speed,
        f.pressure,
        f.precipitation,
    )
}
