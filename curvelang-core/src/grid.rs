//! The square character grid the curve is laid out on.

/// A `2^p x 2^p` grid of characters, rows indexed `x` bottom-to-top,
/// columns indexed `y` left-to-right. Cells past the loaded content read as
/// space; some opcodes mutate the cell they leave.
#[derive(Debug, Clone)]
pub struct Grid {
    p: u32,
    side: usize,
    cells: Vec<char>,
}

impl Grid {
    /// Builds an empty (all-space) grid of order `p`.
    pub fn empty(p: u32) -> Self {
        let side = 1usize << p;
        Self {
            p,
            side,
            cells: vec![' '; side * side],
        }
    }

    pub fn order(&self) -> u32 {
        self.p
    }

    pub fn side(&self) -> u64 {
        self.side as u64
    }

    fn index(&self, x: u64, y: u64) -> Option<usize> {
        if (x as usize) < self.side && (y as usize) < self.side {
            Some(x as usize * self.side + y as usize)
        } else {
            None
        }
    }

    /// Out-of-grid reads behave as space.
    pub fn get(&self, x: u64, y: u64) -> char {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(' ')
    }

    pub fn set(&mut self, x: u64, y: u64, c: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = c;
        }
    }

    /// Loads rows of text in "Hilbert mode": the file's last line occupies
    /// row `x=0`, its first line occupies the top row. Rows/lines shorter
    /// than the grid side are padded with spaces.
    pub fn from_lines(lines: &[String]) -> Self {
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let p = order_for(lines.len().max(longest));
        let mut grid = Grid::empty(p);
        // last line is row 0; file order top-to-bottom maps to x descending.
        let n = lines.len();
        for (i, line) in lines.iter().enumerate() {
            let x = (n - 1 - i) as u64;
            for (y, c) in line.chars().enumerate() {
                grid.set(x, y as u64, c);
            }
        }
        grid
    }

    /// Loads a single stream of non-whitespace characters onto the grid in
    /// Hilbert curve order ("linear mode").
    pub fn from_linear(chars: &[char]) -> Self {
        let p = order_for_linear(chars.len());
        let mut grid = Grid::empty(p);
        for (d, &c) in chars.iter().enumerate() {
            let (x, y) = crate::hilbert::coord_of(d as u64, p);
            grid.set(x, y, c);
        }
        grid
    }
}

/// `p = ceil(log2(max(rows, max line length)))`, with a floor of 0.
fn order_for(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

/// `p` such that `2^p * 2^p >= len`, i.e. enough cells for every character.
fn order_for_linear(len: usize) -> u32 {
    if len <= 1 {
        return 0;
    }
    let mut p = 0u32;
    while (1u64 << p) * (1u64 << p) < len as u64 {
        p += 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_grid_reads_as_space() {
        let g = Grid::empty(1);
        assert_eq!(g.get(99, 99), ' ');
    }

    #[test]
    fn last_line_is_row_zero() {
        let lines = vec!["23+p".to_string()];
        let g = Grid::from_lines(&lines);
        assert_eq!(g.get(0, 0), '2');
        assert_eq!(g.get(0, 1), '3');
    }

    #[test]
    fn two_line_program_top_line_is_highest_row() {
        let lines = vec!["Xp".to_string(), "\"hi\"".to_string()];
        let g = Grid::from_lines(&lines);
        // bottom (last) line occupies row 0
        assert_eq!(g.get(0, 0), '"');
        assert_eq!(g.get(0, 1), 'h');
    }

    #[test]
    fn linear_mode_lays_out_in_hilbert_order() {
        let chars: Vec<char> = "23+p".chars().collect();
        let g = Grid::from_linear(&chars);
        let (x0, y0) = crate::hilbert::coord_of(0, g.order());
        assert_eq!(g.get(x0, y0), '2');
    }
}
