use std::time::{Duration, Instant};

use log::info;

use particle_life::particle::DEFAULT_CATEGORY_NAMES;
use particle_life::{AppSettings, Simulation, Snapshot, TimeController};

const DEFAULT_TICKS: u64 = 600;

struct State {
    simulation: Simulation,
    clock: TimeController,
    tick_count: u32,
    last_report: Instant,
}

impl State {
    fn new(settings: AppSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let clock = TimeController::new(&settings.time)?;
        let simulation = Simulation::new(settings.simulation)?;
        info!("attraction matrix:\n{}", simulation.matrix());

        Ok(Self {
            simulation,
            clock,
            tick_count: 0,
            last_report: Instant::now(),
        })
    }

    fn update(&mut self) {
        if let Some(dt) = self.clock.fixed_dt() {
            self.simulation.tick(dt);
        }

        // Report ticks per second every 500ms
        self.tick_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_report);
        if elapsed >= Duration::from_millis(500) {
            let rate = self.tick_count as f64 / elapsed.as_secs_f64();
            info!("{rate:.1} ticks/s");
            self.tick_count = 0;
            self.last_report = now;
        }
    }
}

fn report(snapshot: &Snapshot) {
    let counts = snapshot
        .category_counts
        .iter()
        .enumerate()
        .map(|(i, count)| format!("{}={count}", category_name(i)))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        "tick {}: {} particles [{counts}], mean speed {:.2}",
        snapshot.ticks, snapshot.particle_count, snapshot.mean_speed
    );
}

fn category_name(index: usize) -> String {
    DEFAULT_CATEGORY_NAMES
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("#{index}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings_path = args
        .next()
        .unwrap_or_else(|| AppSettings::SETTINGS_FILE.to_string());
    let ticks = match args.next() {
        Some(value) => value.parse::<u64>()?,
        None => DEFAULT_TICKS,
    };

    let settings = AppSettings::load(&settings_path)?;
    let mut state = State::new(settings)?;

    let report_every = (ticks / 10).max(1);
    for frame in 1..=ticks {
        state.update();
        if frame % report_every == 0 {
            report(&state.simulation.take_snapshot());
        }
    }

    Ok(())
}
