//! Sense HAT weather station.
//!
//! Cycles the 8×8 LED matrix through four screens (temperature
//! sparkline, numeric temperature, numeric humidity, clock), advancing
//! on a timer. A joystick right-press holds on the current screen and
//! steps manually; a middle-press resumes auto-cycling.
//!
//! ## Usage
//! ```sh
//! ./target/release/weather-station-rs --min-temp 10 --max-temp 40
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This binary requires the 'hardware' feature (Sense HAT drivers).");
    eprintln!("Build with: cargo build --release");
    eprintln!("Tests can run without it: cargo test --no-default-features");
    std::process::exit(1);
}

#[cfg(feature = "hardware")]
fn main() {
    use clap::Parser;
    use std::time::Duration;
    use weather_station_rs::controller::{CyclePacing, DisplayController};
    use weather_station_rs::graph::Range;
    use weather_station_rs::hw::{SenseHatDisplay, SenseHatSensors, SenseHatStick};
    use weather_station_rs::screens::{StationConfig, WeatherStation};
    use weather_station_rs::setup_signal_handler;

    /// Sense HAT weather station display
    #[derive(Parser)]
    #[command(name = "weather-station-rs")]
    #[command(about = "Cycling weather display for the Sense HAT LED matrix")]
    #[command(version)]
    struct Args {
        /// Lower bound of the expected temperature range, °C
        #[arg(long, default_value_t = 10.0)]
        min_temp: f64,

        /// Upper bound of the expected temperature range, °C
        #[arg(long, default_value_t = 40.0)]
        max_temp: f64,

        /// Seconds between automatic screen changes
        #[arg(long, default_value_t = 10)]
        cycle_secs: u64,

        /// Seconds between re-renders while holding on one screen
        #[arg(long, default_value_t = 2)]
        hold_secs: u64,

        /// Milliseconds per text scroll step
        #[arg(long, default_value_t = 100)]
        scroll_ms: u64,

        /// Calibration offset subtracted from raw temperature, °C
        #[arg(long, default_value_t = 1.0)]
        temp_offset: f64,

        /// Rotate the panel 180 degrees (unit mounted upside down)
        #[arg(long)]
        rotate: bool,

        /// Dim the panel for night use
        #[arg(long)]
        low_light: bool,
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false) // No ANSI color codes for systemd/journald
        .compact()
        .init();

    let args = Args::parse();

    let range = match Range::new(args.min_temp, args.max_temp) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("bad temperature range: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Weather station v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Temperature range: {}..{} °C", range.min(), range.max());
    tracing::info!(
        "Cycle: {}s auto, {}s hold, offset {} °C",
        args.cycle_secs,
        args.hold_secs,
        args.temp_offset
    );

    let sensors = match SenseHatSensors::open() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    let display = match SenseHatDisplay::open(args.rotate, args.low_light) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    let input = match SenseHatStick::open() {
        Ok(i) => i,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut config = StationConfig::new(range);
    config.temp_offset = args.temp_offset;
    config.scroll_delay = Duration::from_millis(args.scroll_ms);
    let station = WeatherStation::new(sensors, display, config);

    let pacing = CyclePacing {
        auto_interval: Duration::from_secs(args.cycle_secs),
        hold_interval: Duration::from_secs(args.hold_secs),
    };
    let running = setup_signal_handler();

    // The screen list is non-empty by construction, so this cannot
    // fail; keep the error path anyway rather than unwrapping.
    let mut controller = match DisplayController::new(station, input, pacing, running) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("controller setup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.run() {
        tracing::error!("exiting after render failure: {e}");
        std::process::exit(1);
    }
}
