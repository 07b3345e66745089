use std::{fmt::Display, str::FromStr, time::Duration};

use itertools::Itertools;
use rand::Rng;

use crate::{
    grid::{CellRef, Grid, Pending},
    timer::Timer,
};

// Seeding generator constants. Together with the bit-16 test these are a
// reproducibility contract: equal seed and dimensions must give equal grids
// across runs and across implementations.
const LCG_MODULUS: u64 = 1 << 31;
const LCG_MULTIPLIER: u64 = 1103515245;
const LCG_INCREMENT: u64 = 12345;
const LCG_ALIVE_MASK: u32 = 0x10000;

pub type Hook = Box<dyn FnMut(&Simulation)>;

/// Construction options, each with a default: a 32x32 grid, 100 random start
/// cells, a 200ms tick delay, and no observer hooks.
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub start_rand_cells: usize,
    pub tick_delay: Duration,
    pub on_tick: Option<Hook>,
    pub on_finished: Option<Hook>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            start_rand_cells: 100,
            tick_delay: Duration::from_millis(200),
            on_tick: None,
            on_finished: None,
        }
    }
}

impl Config {
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn start_rand_cells(mut self, count: usize) -> Self {
        self.start_rand_cells = count;
        self
    }

    pub fn tick_delay(mut self, delay: Duration) -> Self {
        self.tick_delay = delay;
        self
    }

    /// Invoked at the start of each tick's evaluation phase.
    pub fn on_tick(mut self, hook: impl FnMut(&Simulation) + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }

    /// Invoked once when the population reaches zero.
    pub fn on_finished(mut self, hook: impl FnMut(&Simulation) + 'static) -> Self {
        self.on_finished = Some(Box::new(hook));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Paused,
    Finished,
}

pub struct Simulation {
    grid: Grid,
    generation: u64,
    status: Status,
    // At most one commit is ever outstanding; `clear` is the only way to
    // cancel it.
    pending_commit: bool,
    tick_delay: Duration,
    start_rand_cells: usize,
    on_tick: Option<Hook>,
    on_finished: Option<Hook>,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, String> {
        let Config {
            width,
            height,
            start_rand_cells,
            tick_delay,
            on_tick,
            on_finished,
        } = config;
        if width == 0 || height == 0 {
            return Err(format!("grid must be at least 1x1, got {width}x{height}"));
        }
        Ok(Self {
            grid: Grid::new(width, height),
            generation: 0,
            status: Status::Idle,
            pending_commit: false,
            tick_delay,
            start_rand_cells,
            on_tick,
            on_finished,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    pub fn start_rand_cells(&self) -> usize {
        self.start_rand_cells
    }

    /// Host-facing cell toggles, e.g. for translating pointer input.
    pub fn set_alive(&mut self, c: CellRef) {
        self.grid.set_alive(c);
    }

    pub fn set_dead(&mut self, c: CellRef) {
        self.grid.set_dead(c);
    }
}

impl Simulation {
    /// Seeds `count` cells chosen uniformly with replacement. Repeated hits
    /// are idempotent, so fewer than `count` cells may end up alive.
    pub fn seed_random(&mut self, rng: &mut impl Rng, count: usize) {
        for _ in 0..count {
            let i = rng.gen_range(0..self.grid.len());
            self.grid.set_alive(CellRef(i));
        }
    }

    /// Seeds every cell from a 31-bit linear congruential sequence starting
    /// at `seed`; cell i lives iff bit 16 of the i-th value is set.
    pub fn seed_deterministic(&mut self, seed: u32) {
        let next = |&v: &u32| ((u64::from(v) * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS) as u32;
        for (i, value) in itertools::iterate(seed, next).take(self.grid.len()).enumerate() {
            if value & LCG_ALIVE_MASK != 0 {
                self.grid.set_alive(CellRef(i));
            }
        }
    }
}

impl Simulation {
    /// Evaluation phase. Only pending flags are written here; every
    /// neighbour count reads the unmodified previous generation, whatever
    /// order the cells are visited in. The scheduled commit stays
    /// outstanding until `commit` or `clear`.
    pub fn tick(&mut self) {
        if self.status != Status::Running || self.pending_commit {
            return;
        }
        self.fire_on_tick();
        for i in 0..self.grid.len() {
            let c = CellRef(i);
            match (self.grid.alive(c), self.grid.living_neighbours(c)) {
                (true, 2 | 3) => (),
                (true, _) => self.grid.mark(c, Pending::Die),
                (false, 3) => self.grid.mark(c, Pending::Live),
                (false, _) => (),
            }
        }
        self.pending_commit = true;
    }

    /// Commit phase: applies the transitions recorded by the last `tick`.
    /// No-op when nothing is scheduled. A surviving population advances the
    /// generation counter; an empty one finishes the simulation for good.
    pub fn commit(&mut self) {
        if !self.pending_commit {
            return;
        }
        self.pending_commit = false;
        for i in 0..self.grid.len() {
            let c = CellRef(i);
            match self.grid.take_pending(c) {
                Some(Pending::Live) => self.grid.set_alive(c),
                Some(Pending::Die) => self.grid.set_dead(c),
                None => (),
            }
        }
        if self.grid.population() > 0 {
            self.generation += 1;
        } else {
            self.status = Status::Finished;
            self.fire_on_finished();
        }
    }

    pub fn start(&mut self) {
        if self.status != Status::Idle {
            return;
        }
        self.status = Status::Running;
        self.tick();
    }

    /// Stops further ticks. An already-scheduled commit still applies.
    pub fn pause(&mut self) {
        if self.status == Status::Running {
            self.status = Status::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status != Status::Paused {
            return;
        }
        self.status = Status::Running;
        self.tick();
    }

    /// Cancels any scheduled commit and restores the freshly-built all-dead
    /// state. Valid from any state.
    pub fn clear(&mut self) {
        self.pending_commit = false;
        self.generation = 0;
        self.grid.reset();
        self.status = Status::Idle;
    }

    /// Drives the loop until the simulation finishes or pauses. Each pass
    /// waits out the tick delay and commits before the next evaluation runs,
    /// so commits never overlap an evaluation.
    pub fn run(&mut self, timer: &mut impl Timer) {
        match self.status {
            Status::Idle => self.start(),
            Status::Paused => self.resume(),
            Status::Running | Status::Finished => (),
        }
        while self.pending_commit {
            timer.wait(self.tick_delay);
            self.commit();
            self.tick();
        }
    }

    fn fire_on_tick(&mut self) {
        if let Some(mut hook) = self.on_tick.take() {
            hook(self);
            self.on_tick = Some(hook);
        }
    }

    fn fire_on_finished(&mut self) {
        if let Some(mut hook) = self.on_finished.take() {
            hook(self);
            self.on_finished = Some(hook);
        }
    }
}

pub(crate) fn dedent(s: &str) -> String {
    let get_indent = |s: &str| match s.trim_start().len() {
        0 => None,
        l => Some(s.len() - l),
    };
    let s = s.trim_end();
    let indent = s.lines().filter_map(get_indent).min().unwrap_or_default();
    let lines = s.lines().skip_while(|l| l.trim().is_empty());
    lines.map(|l| l.split_at(indent).1.trim_end()).join("\n")
}

impl FromStr for Simulation {
    type Err = String;

    /// Builds a simulation sized to the pattern: one row per line, 'o' for
    /// live, '.' or ' ' for dead, defaults for everything else.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = dedent(s);
        let height = s.lines().count();
        let width = s.lines().map(str::len).max().unwrap_or_default();
        let mut sim = Simulation::new(Config::default().size(width, height))?;
        for (y, line) in s.lines().enumerate() {
            for (x, c) in line.chars().enumerate() {
                match c {
                    '.' | ' ' => (),
                    'o' => sim.grid.set_alive(CellRef(y * width + x)),
                    _ => return Err(format!("Unexpected character {c}")),
                }
            }
        }
        Ok(sim)
    }
}

impl Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row = |y: usize| {
            (0..self.grid.width())
                .map(|x| match self.grid.alive(CellRef(y * self.grid.width() + x)) {
                    true => 'o',
                    false => '.',
                })
                .collect::<String>()
        };
        f.write_str(&(0..self.grid.height()).map(row).join("\n"))
    }
}
