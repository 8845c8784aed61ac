use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use launch_azimuth::config::{self, SolverConfig};
use launch_azimuth::io::{csv, json};
use launch_azimuth::targeting::geo::wrap_longitude;
use launch_azimuth::{presets, solve_checked, solve_with, sweep, GeoCoordinate, MissionRequest, Solution};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Launch azimuth and inclination to overfly a recovery site after N orbits"
)]
struct Cli {
    /// Solver config (TOML). Defaults to Earth, 270 km apogee, 6 fixed passes
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log solver progress (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a single scenario
    Solve {
        #[command(flatten)]
        sites: SiteArgs,

        /// Completed orbits before the recovery pass
        #[arg(long, default_value_t = 0)]
        orbits: u32,

        /// Emit JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Fail on degenerate geometry instead of printing NaN
        #[arg(long, default_value_t = false)]
        checked: bool,

        /// Also write the solution as JSON to this path
        #[arg(long)]
        output: Option<String>,
    },
    /// Solve for every orbit count from 0 to --max-orbits
    Sweep {
        #[command(flatten)]
        sites: SiteArgs,

        #[arg(long, default_value_t = 6)]
        max_orbits: u32,

        /// CSV output path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Prompt for scenarios until an orbit count of 0 is entered
    Interactive,
}

#[derive(Args)]
struct SiteArgs {
    /// Insertion (cutoff) altitude in km
    #[arg(long, default_value_t = 160.9)]
    cutoff_altitude: f64,

    /// Launch latitude, deg (defaults to Cape Canaveral)
    #[arg(long, default_value_t = presets::CAPE_CANAVERAL.latitude, allow_negative_numbers = true)]
    launch_lat: f64,

    /// Launch longitude, deg east
    #[arg(long, default_value_t = presets::CAPE_CANAVERAL.longitude, allow_negative_numbers = true)]
    launch_lon: f64,

    /// Recovery site latitude, deg
    #[arg(long, allow_negative_numbers = true)]
    target_lat: f64,

    /// Recovery site longitude, deg east
    #[arg(long, allow_negative_numbers = true)]
    target_lon: f64,
}

impl SiteArgs {
    fn request(&self, orbit_count: u32) -> MissionRequest {
        MissionRequest::new(
            self.cutoff_altitude * 1000.0,
            GeoCoordinate::new(self.launch_lat, self.launch_lon).wrapped(),
            GeoCoordinate::new(self.target_lat, self.target_lon).wrapped(),
            orbit_count,
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load(path)
            .with_context(|| format!("loading solver config {}", path.display()))?,
        None => SolverConfig::default(),
    };

    match cli.command {
        Command::Solve {
            sites,
            orbits,
            json: as_json,
            checked,
            output,
        } => {
            let request = sites.request(orbits);
            let solution = if checked {
                solve_checked(&request, &config)?
            } else {
                solve_with(&request, &config)
            };
            if !solution.is_finite() {
                warn!("no finite solution for this geometry");
            }
            if let Some(path) = &output {
                json::write_solution_file(path, &request, &solution)
                    .with_context(|| format!("writing {}", path))?;
            }
            if as_json {
                json::write_solution(&mut io::stdout().lock(), &request, &solution)?;
            } else {
                print_report(&request, &solution, &config);
            }
        }
        Command::Sweep {
            sites,
            max_orbits,
            output,
        } => {
            let counts: Vec<u32> = (0..=max_orbits).collect();
            let solutions = sweep(&sites.request(0), counts.iter().copied(), &config);
            match output {
                Some(path) => csv::write_sweep_file(&path, &counts, &solutions)
                    .with_context(|| format!("writing {}", path))?,
                None => csv::write_sweep(&mut io::stdout().lock(), &counts, &solutions)?,
            }
        }
        Command::Interactive => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_interactive(&mut stdin.lock(), &mut stdout.lock(), &config)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

fn print_report(request: &MissionRequest, solution: &Solution, config: &SolverConfig) {
    let orbit = &solution.orbit;
    let radius = config.planet.radius;

    println!();
    println!("====================================================================");
    println!("  LAUNCH AZIMUTH — {} orbit(s) to recovery", request.orbit_count);
    println!("====================================================================");
    println!();
    println!("  Sites");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Launch:        {:>8.3} lat  {:>9.3} lon",
        request.launch_site.latitude, request.launch_site.longitude
    );
    println!(
        "  Recovery:      {:>8.3} lat  {:>9.3} lon",
        request.target_site.latitude, request.target_site.longitude
    );
    println!(
        "  Ground range:  {:>8.1} km",
        request.launch_site.angle_to(&request.target_site) * radius / 1000.0
    );
    println!();
    println!("  Insertion Orbit");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Perigee:       {:>8.1} km    Apogee:       {:>8.1} km",
        (orbit.perigee_radius() - radius) / 1000.0,
        (orbit.apogee_radius() - radius) / 1000.0
    );
    println!(
        "  Period:        {:>8.2} min   Eccentricity: {:>8.5}",
        orbit.period / 60.0,
        orbit.ecc
    );
    println!(
        "  Cutoff speed:  {:>8.1} m/s   Flight time:  {:>8.1} min",
        orbit.cutoff_velocity,
        solution.flight_time / 60.0
    );
    println!();
    println!("  Targeting");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Azimuth:       {:>10.4} deg (surface-relative)", solution.azimuth);
    println!("  Inertial az:   {:>10.4} deg", solution.inertial_azimuth);
    println!("  Inclination:   {:>10.4} deg", solution.inclination);
    println!(
        "  J2 drift:      node {:>+8.4} deg   perigee {:>+8.4} deg",
        solution.state.nodal_drift.to_degrees(),
        solution.state.apsidal_drift.to_degrees()
    );
    println!();
    println!("  Solver: {} passes", solution.passes);
    println!("====================================================================");
    println!();
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// Prompt-driven loop. Zero orbits (or end of input) ends the session; it
/// is never passed to the solver.
fn run_interactive<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &SolverConfig,
) -> Result<()> {
    loop {
        let launch = match ask(input, output, "Launch from Cape Canaveral? [Y/n]: ")? {
            None => return Ok(()),
            Some(answer) if answer.is_empty() || answer.eq_ignore_ascii_case("y") => {
                presets::CAPE_CANAVERAL
            }
            Some(_) => {
                let Some(lat) = ask_number(input, output, "Launch latitude (deg): ")? else {
                    return Ok(());
                };
                let Some(lon) = ask_number(input, output, "Launch longitude (deg): ")? else {
                    return Ok(());
                };
                GeoCoordinate::new(lat, lon)
            }
        };
        let Some(target_lat) = ask_number(input, output, "Target latitude (deg): ")? else {
            return Ok(());
        };
        let Some(target_lon) = ask_number(input, output, "Target longitude (deg): ")? else {
            return Ok(());
        };
        let Some(orbits) = ask_orbits(input, output)? else {
            return Ok(());
        };
        if orbits == 0 {
            return Ok(());
        }

        let request = MissionRequest::new(
            presets::REFERENCE_CUTOFF_ALTITUDE,
            GeoCoordinate::new(launch.latitude, wrap_longitude(launch.longitude)),
            GeoCoordinate::new(target_lat, wrap_longitude(target_lon)),
            orbits,
        );
        let solution = solve_with(&request, config);
        writeln!(output, "Azimuth:     {:.4} deg", solution.azimuth)?;
        writeln!(output, "Inclination: {:.4} deg", solution.inclination)?;
        writeln!(output)?;
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Re-prompts until a number is entered. `None` on end of input.
fn ask_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<Option<f64>> {
    loop {
        let Some(answer) = ask(input, output, prompt)? else {
            return Ok(None);
        };
        match answer.parse::<f64>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(output, "Not a number: {:?}", answer)?,
        }
    }
}

/// Re-prompts until a whole, non-negative orbit count is entered.
fn ask_orbits<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<u32>> {
    loop {
        let Some(answer) = ask(input, output, "Orbits (0 to quit): ")? else {
            return Ok(None);
        };
        match answer.parse::<u32>() {
            Ok(count) => return Ok(Some(count)),
            Err(_) => writeln!(output, "Not a whole number of orbits: {:?}", answer)?,
        }
    }
}
