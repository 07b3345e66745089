use std::time::Duration;

use log::{debug, info, warn};
use torus_life::{Config, Simulation, Status, ThreadTimer, Timer};

struct MainArgs {
    width: usize,
    height: usize,
    cells: usize,
    delay_ms: u64,
    seed: Option<String>,
    generations: Option<u64>,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = MainArgs {
        width: 32,
        height: 32,
        cells: 100,
        delay_ms: 200,
        seed: None,
        generations: None,
    };
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                parsed.width = next_arg(i, "--width")
                    .parse()
                    .expect("--width requires a positive integer");
            }
            "--height" => {
                i += 1;
                parsed.height = next_arg(i, "--height")
                    .parse()
                    .expect("--height requires a positive integer");
            }
            "--cells" => {
                i += 1;
                parsed.cells = next_arg(i, "--cells")
                    .parse()
                    .expect("--cells requires a positive integer");
            }
            "--delay-ms" => {
                i += 1;
                parsed.delay_ms = next_arg(i, "--delay-ms")
                    .parse()
                    .expect("--delay-ms requires a positive integer");
            }
            "--seed" => {
                i += 1;
                parsed.seed = Some(next_arg(i, "--seed").to_string());
            }
            "--generations" => {
                i += 1;
                parsed.generations = Some(
                    next_arg(i, "--generations")
                        .parse()
                        .expect("--generations requires a positive integer"),
                );
            }
            other => panic!(
                "unknown argument: {other}\nusage: torus-life [--width N] [--height N] [--cells N] [--delay-ms N] [--seed VALUE] [--generations N]"
            ),
        }
        i += 1;
    }
    parsed
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let config = Config::default()
        .size(args.width, args.height)
        .start_rand_cells(args.cells)
        .tick_delay(Duration::from_millis(args.delay_ms))
        .on_tick(|sim| debug!("generation {} population {}", sim.generation(), sim.population()))
        .on_finished(|sim| info!("all cells dead after generation {}", sim.generation()));
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Non-numeric seed input falls back to random seeding.
    match args.seed.as_deref().map(str::parse::<u32>) {
        Some(Ok(seed)) => sim.seed_deterministic(seed),
        Some(Err(_)) => {
            warn!("seed is not a number, seeding randomly");
            sim.seed_random(&mut rand::thread_rng(), args.cells);
        }
        None => sim.seed_random(&mut rand::thread_rng(), args.cells),
    }
    info!(
        "{}x{} grid seeded with {} live cells",
        sim.grid().width(),
        sim.grid().height(),
        sim.population()
    );

    let mut timer = ThreadTimer;
    match args.generations {
        None => sim.run(&mut timer),
        Some(max) => {
            sim.start();
            while sim.status() == Status::Running && sim.generation() < max {
                timer.wait(sim.tick_delay());
                sim.commit();
                sim.tick();
            }
            if sim.status() == Status::Running {
                sim.pause();
                info!("paused after {} generations", sim.generation());
            }
        }
    }
    println!("{sim}");
}
