#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pending {
    Live,
    Die,
}

#[derive(Clone, Copy, Default, Debug)]
struct Cell {
    alive: bool,
    pending: Option<Pending>,
}

/// Fixed-size cell store with toroidal topology. Cells are addressed by their
/// linear index; `(x, y) = (i % width, i / width)`.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    population: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            population: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn alive(&self, CellRef(i): CellRef) -> bool {
        self.cells[i].alive
    }

    pub fn set_alive(&mut self, CellRef(i): CellRef) {
        let cell = &mut self.cells[i];
        if !cell.alive {
            cell.alive = true;
            self.population += 1;
        }
        cell.pending = None;
    }

    pub fn set_dead(&mut self, CellRef(i): CellRef) {
        let cell = &mut self.cells[i];
        if cell.alive {
            cell.alive = false;
            self.population -= 1;
        }
        cell.pending = None;
    }

    pub(crate) fn mark(&mut self, CellRef(i): CellRef, pending: Pending) {
        self.cells[i].pending = Some(pending);
    }

    pub(crate) fn take_pending(&mut self, CellRef(i): CellRef) -> Option<Pending> {
        self.cells[i].pending.take()
    }

    /// Kills every cell in place; no reallocation.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.population = 0;
    }
}

impl Grid {
    pub fn north(&self, CellRef(i): CellRef) -> CellRef {
        match i.checked_sub(self.width) {
            Some(n) => CellRef(n),
            // Wrap to the bottommost row, same column
            None => CellRef(i + self.len() - self.width),
        }
    }

    pub fn south(&self, CellRef(i): CellRef) -> CellRef {
        match i + self.width {
            n if n < self.len() => CellRef(n),
            // Wrap to the topmost row, same column
            n => CellRef(n - self.len()),
        }
    }

    pub fn east(&self, CellRef(i): CellRef) -> CellRef {
        match (i + 1) % self.width {
            // End of row - wrap to the start of the same row
            0 => CellRef(i + 1 - self.width),
            _ => CellRef(i + 1),
        }
    }

    pub fn west(&self, CellRef(i): CellRef) -> CellRef {
        match i % self.width {
            // Start of row - wrap to the end of the same row
            0 => CellRef(i + self.width - 1),
            _ => CellRef(i - 1),
        }
    }

    /// The 8 neighbours in order N, NE, E, SE, S, SW, W, NW. Diagonals are
    /// composed from two cardinal hops, so they wrap exactly like the
    /// cardinals do, corners included.
    pub fn neighbours(&self, c: CellRef) -> [CellRef; 8] {
        let (n, s) = (self.north(c), self.south(c));
        [
            n,
            self.east(n),
            self.east(c),
            self.east(s),
            s,
            self.west(s),
            self.west(c),
            self.west(n),
        ]
    }

    pub fn living_neighbours(&self, c: CellRef) -> usize {
        self.neighbours(c)
            .into_iter()
            .filter(|&n| self.alive(n))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_wraparound_self_inverse() {
        for (w, h) in (1..=6).cartesian_product(1..=6) {
            let grid = Grid::new(w, h);
            for i in 0..grid.len() {
                let c = CellRef(i);
                assert_eq!(grid.north(grid.south(c)), c);
                assert_eq!(grid.south(grid.north(c)), c);
                assert_eq!(grid.east(grid.west(c)), c);
                assert_eq!(grid.west(grid.east(c)), c);
            }
        }
    }

    #[test]
    fn test_neighbours_distinct() {
        for (w, h) in (3..=7).cartesian_product(3..=7) {
            let grid = Grid::new(w, h);
            for i in 0..grid.len() {
                let c = CellRef(i);
                let ns = grid.neighbours(c);
                assert_eq!(ns.iter().unique().count(), 8);
                assert!(!ns.contains(&c));
            }
        }
    }

    #[test]
    fn test_degenerate_grids_repeat_neighbours() {
        // Expected on a 2-wide torus: east and west land on the same cell.
        let grid = Grid::new(2, 4);
        let c = CellRef(0);
        assert_eq!(grid.east(c), grid.west(c));
        assert!(grid.neighbours(c).iter().unique().count() < 8);
    }

    #[test]
    fn test_corner_neighbours() {
        // Top-left corner of a 4x4 grid wraps on both axes at once.
        let grid = Grid::new(4, 4);
        let expected = [12, 13, 1, 5, 4, 7, 3, 15].map(CellRef);
        assert_eq!(grid.neighbours(CellRef(0)), expected);
    }

    #[test]
    fn test_population_tracking() {
        let mut grid = Grid::new(3, 3);
        grid.set_alive(CellRef(4));
        grid.set_alive(CellRef(4));
        assert_eq!(grid.population(), 1);
        grid.set_dead(CellRef(4));
        grid.set_dead(CellRef(4));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_living_neighbours_wrap() {
        // Opposite edges are adjacent.
        let mut grid = Grid::new(4, 4);
        grid.set_alive(CellRef(3));
        grid.set_alive(CellRef(12));
        grid.set_alive(CellRef(15));
        assert_eq!(grid.living_neighbours(CellRef(0)), 3);
    }
}
