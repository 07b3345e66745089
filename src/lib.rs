//! Conway's Game of Life on a fixed-size toroidal grid, advanced with a
//! two-phase evaluate-then-commit tick.

mod grid;
mod simulation;
mod timer;


pub use crate::{
    grid::{CellRef, Grid},
    simulation::{Config, Hook, Simulation, Status},
    timer::{ThreadTimer, Timer},
};
