use clap::Parser;
use ride_dispatch::utils::error::ErrorSeverity;
use ride_dispatch::utils::logger::{self, LogFormat};
use ride_dispatch::{CliConfig, Command, DispatchError, Driver, Passenger, Registry, Result, Trip};
use serde_json::json;

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    let format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, config.verbose);

    tracing::info!("Starting ride-dispatch CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> Result<()> {
    let settings = config.resolve()?;
    let json_output = settings.json_output();

    let mut registry = Registry::load(&settings.record_source())?;

    match &config.command {
        Command::Passengers => {
            if json_output {
                return print_json(&registry.passengers());
            }
            for passenger in registry.passengers() {
                print_passenger(passenger);
            }
        }
        Command::Drivers => {
            if json_output {
                return print_json(&registry.drivers());
            }
            for driver in registry.drivers() {
                print_driver(driver);
            }
        }
        Command::Available => {
            let available = registry.find_available_drivers();
            if json_output {
                return print_json(&available);
            }
            println!("{} driver(s) available", available.len());
            for driver in available {
                print_driver(driver);
            }
        }
        Command::Passenger { id } => {
            let passenger = registry.find_passenger(*id)?;
            let trips = registry.passenger_trips(*id)?;
            let spent = registry.net_expenditures(*id)?;
            let minutes = registry.total_time_spent(*id)?.num_minutes();
            if json_output {
                return print_json(&json!({
                    "passenger": passenger,
                    "trips": trips,
                    "net_expenditures": spent,
                    "total_time_spent_minutes": minutes,
                }));
            }
            print_passenger(passenger);
            println!("  spent ${:.2} over {} minute(s)", spent, minutes);
            for trip in trips {
                print_trip(trip);
            }
        }
        Command::Driver { id } => {
            let driver = registry.find_driver(*id)?;
            let trips = registry.driver_trips(*id)?;
            let rating = registry.average_rating(*id)?;
            let revenue = registry.total_revenue(*id)?;
            if json_output {
                return print_json(&json!({
                    "driver": driver,
                    "trips": trips,
                    "average_rating": rating,
                    "total_revenue": revenue,
                }));
            }
            print_driver(driver);
            println!("  average rating {:.2}, revenue ${:.2}", rating, revenue);
            for trip in trips {
                print_trip(trip);
            }
        }
        Command::Request { passenger_ids } => {
            let mut created = Vec::new();
            for passenger_id in passenger_ids {
                let trip = registry.request_trip(*passenger_id)?.clone();
                if !json_output {
                    println!(
                        "✅ Trip {} assigned: driver {} picks up passenger {}",
                        trip.id, trip.driver_id, trip.passenger_id
                    );
                }
                created.push(trip);
            }
            if json_output {
                return print_json(&created);
            }
        }
        Command::Check => {
            let mismatches = registry.status_mismatches();
            if json_output {
                let rows: Vec<_> = mismatches
                    .iter()
                    .map(|m| {
                        json!({
                            "driver_id": m.driver_id,
                            "status": m.status,
                            "in_progress_trips": m.in_progress_trips,
                        })
                    })
                    .collect();
                return print_json(&rows);
            }
            println!(
                "Loaded {} passengers, {} drivers, {} trips",
                registry.passengers().len(),
                registry.drivers().len(),
                registry.trips().len()
            );
            if mismatches.is_empty() {
                println!("✅ Driver statuses match trip history");
            }
            for m in mismatches {
                println!(
                    "⚠️  Driver {} is {} with {} in-progress trip(s)",
                    m.driver_id, m.status, m.in_progress_trips
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(DispatchError::from)?;
    println!("{}", rendered);
    Ok(())
}

fn print_passenger(passenger: &Passenger) {
    println!(
        "#{:<4} {:<24} {} trip(s)",
        passenger.id,
        passenger.name,
        passenger.trips.len()
    );
}

fn print_driver(driver: &Driver) {
    println!(
        "#{:<4} {:<24} {:<11} {} trip(s)",
        driver.id,
        driver.name,
        driver.status,
        driver.trips.len()
    );
}

fn print_trip(trip: &Trip) {
    let end = trip
        .end_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "in progress".to_string());
    println!(
        "    trip {:<4} {} -> {}  cost {}  rating {}",
        trip.id,
        trip.start_time.to_rfc3339(),
        end,
        trip.cost.map(|c| format!("${:.2}", c)).unwrap_or_else(|| "-".to_string()),
        trip.rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
    );
}
