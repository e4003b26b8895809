//! # Terminal Rendering
//!
//! Plain-text views of the puzzle and the CPU. Heights are shown one-based,
//! the way a player reads them.

use towers_core::{Direction, Puzzle, PuzzleScheduler};

/// Draw the grid with its hints around the edges.
///
/// Unsolved cells are drawn as `.` unless `show_candidates` is set, in
/// which case their remaining heights are listed.
pub fn grid(puzzle: &Puzzle, show_candidates: bool) -> String {
    let size = puzzle.size();

    let cells: Vec<Vec<String>> = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| cell_label(puzzle, row, col, show_candidates))
                .collect()
        })
        .collect();
    let width = cells
        .iter()
        .flatten()
        .map(String::len)
        .chain(std::iter::once(size.to_string().len()))
        .max()
        .unwrap_or(1);

    let label = |hint: Option<usize>| hint.map(|h| h.to_string()).unwrap_or_default();
    let hint = |direction: Direction, index: usize| label(puzzle.hint(direction, index));
    let edge = |direction: Direction| {
        let labels: Vec<String> = puzzle
            .get_hints(direction)
            .iter()
            .map(|&h| format!("{:>width$}", label(h)))
            .collect();
        format!("{:margin$}  {}\n", "", labels.join(" "), margin = width)
    };
    let rule = format!(
        "{:margin$} +{}+\n",
        "",
        "-".repeat(size.saturating_mul(width.saturating_add(1)).saturating_add(1)),
        margin = width
    );

    let mut out = String::new();
    out.push_str(&edge(Direction::Top));
    out.push_str(&rule);
    for (row, labels) in cells.iter().enumerate() {
        let padded: Vec<String> = labels.iter().map(|l| format!("{:>width$}", l)).collect();
        out.push_str(&format!(
            "{:>width$} | {} | {}\n",
            hint(Direction::Left, row),
            padded.join(" "),
            hint(Direction::Right, row)
        ));
    }
    out.push_str(&rule);
    out.push_str(&edge(Direction::Bottom));
    out
}

fn cell_label(puzzle: &Puzzle, row: usize, col: usize, show_candidates: bool) -> String {
    if let Some(val) = puzzle.solved_value(row, col) {
        return val.saturating_add(1).to_string();
    }
    let marks = puzzle.marks_cell(row, col);
    if marks.is_empty() {
        return "!".to_string();
    }
    if !show_candidates {
        return ".".to_string();
    }
    let listed: Vec<String> = marks.iter().map(|v| v.saturating_add(1).to_string()).collect();
    listed.join("")
}

/// One-line summary of the puzzle state.
pub fn puzzle_status(puzzle: &Puzzle) -> String {
    let size = puzzle.size();
    let solved = (0..size)
        .flat_map(|row| (0..size).map(move |col| (row, col)))
        .filter(|&(row, col)| puzzle.solved_value(row, col).is_some())
        .count();
    let mut line = format!(
        "solved {}/{} cells, {} actions, guess depth {}",
        solved,
        size.saturating_mul(size),
        puzzle.history_len(),
        puzzle.guess_depth()
    );
    if let Some(contradiction) = puzzle.contradiction() {
        line.push_str(&format!(", contradiction: {}", contradiction));
    }
    line
}

/// Cores, RAM, and the processes currently on the CPU.
pub fn scheduler_status(cpu: &PuzzleScheduler) -> String {
    let mut out = format!(
        "cores {}/{}  ram {}/{}  pulses {}\n",
        cpu.cores_in_use(),
        cpu.cores(),
        cpu.ram().used(),
        cpu.ram().capacity(),
        cpu.pulse_count()
    );
    for id in cpu.active_processes() {
        let ram = cpu.ram().allocation(id).unwrap_or(0);
        out.push_str(&format!("  running  {} ({} ram)\n", id, ram));
    }
    let queued = cpu.queued_processes().count();
    if queued > 0 {
        out.push_str(&format!("  queued   {} processes\n", queued));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use towers_core::{PuzzleSeed, Triple};

    fn hinted() -> Puzzle {
        let mut seed = PuzzleSeed::blank(3);
        seed.hints.top = vec![Some(3), None, Some(1)];
        seed.hints.left = vec![None, Some(2), None];
        seed.givens = vec![Triple::new(0, 0, 0)];
        Puzzle::from_seed(seed).expect("seed")
    }

    #[test]
    fn grid_shows_hints_and_givens() {
        let text = grid(&hinted(), false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "   3   1");
        assert_eq!(lines[1], "  +-------+");
        assert_eq!(lines[2], "  | 1 . . | ");
        assert_eq!(lines[3], "2 | . . . | ");
    }

    #[test]
    fn candidates_widen_cells() {
        let text = grid(&hinted(), true);
        assert!(text.contains("123"));
        assert!(text.contains("  1 "));
    }

    #[test]
    fn status_mentions_progress() {
        let puzzle = hinted();
        assert_eq!(
            puzzle_status(&puzzle),
            "solved 1/9 cells, 0 actions, guess depth 0"
        );
    }

    #[test]
    fn scheduler_status_lists_capacity() {
        let cpu = PuzzleScheduler::with_capacity(2, 3000);
        assert_eq!(scheduler_status(&cpu), "cores 0/2  ram 0/3000  pulses 0\n");
    }
}
