//! Line breaking over measured cells.
//!
//! The breaker is a pure scan: it never writes into units, so the same code serves both
//! measurement passes and the full layout pass.

use crate::script::{self, CharClass};
use crate::style::ScriptType;

/// What the breaker needs to know about one unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    pub class: CharClass,
    pub leading: bool,
    pub trailing: bool,
    pub w: f32,
    /// Distance from this unit's origin to the next, before cross-unit extras.
    pub advance: f32,
    pub skew: f32,
    pub skew_descent: f32,
    pub bearing_right: f32,
    pub line_height: f32,
    pub ascent: f32,
    pub descent: f32,
    pub ink_height: f32,
    pub italic: bool,
    pub script: ScriptType,
    pub break_western: bool,
}

impl Cell {
    pub fn for_char(ch: Option<char>, class: CharClass) -> Self {
        Self {
            class,
            leading: ch.is_some_and(script::is_leading),
            trailing: ch.is_some_and(script::is_trailing),
            ..Default::default()
        }
    }

    fn is_space(&self) -> bool {
        self.class == CharClass::Space
    }

    fn is_newline(&self) -> bool {
        self.class == CharClass::Newline
    }

    /// Extra room needed between `self` and the following cell.
    pub fn extra_before(&self, next: &Cell) -> f32 {
        match (self.script, next.script) {
            (a, ScriptType::Superscript) if a != ScriptType::Superscript => return self.skew,
            (a, ScriptType::Subscript) if a != ScriptType::Subscript => return self.skew_descent,
            _ => {}
        }
        match (self.italic, next.italic) {
            (true, false) => self.skew,
            (false, true) => next.skew_descent,
            _ => 0.0,
        }
    }

    /// Right edge of the ink when this cell starts at `x`.
    fn right_edge(&self, x: f32) -> f32 {
        x + self.w + self.skew + self.bearing_right
    }
}

/// Per-line scan state. Reset at every line start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreakLineInfo {
    /// Exclusive end of the line.
    pub end: usize,
    pub line_height: f32,
    pub max_ascent: f32,
    pub max_descent: f32,
    pub max_ink_height: f32,
    /// Ordinal of the line.
    pub line: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct BreakOptions {
    pub max_width: f32,
    pub auto_break: bool,
    /// Right aligned text moves trailing whitespace to the next line.
    pub align_right: bool,
}

/// Offsets of every cell in `cells[start..end]` relative to the line start.
pub fn line_offsets(cells: &[Cell], start: usize, end: usize, out: &mut Vec<f32>) {
    out.clear();
    let mut x = 0.0;
    for i in start..end {
        if i > start {
            x += cells[i - 1].advance + cells[i - 1].extra_before(&cells[i]);
        }
        out.push(x);
    }
}

/// Visible width of `cells[start..end]`: up to the ink edge of the last non-whitespace cell.
pub fn line_width(cells: &[Cell], start: usize, end: usize) -> f32 {
    let mut x = 0.0;
    let mut width: f32 = 0.0;
    for i in start..end {
        if i > start {
            x += cells[i - 1].advance + cells[i - 1].extra_before(&cells[i]);
        }
        let cell = &cells[i];
        if !cell.class.is_whitespace() {
            width = width.max(cell.right_edge(x));
        }
    }
    width
}

/// Find where the line starting at `start` ends.
pub fn scan_line(cells: &[Cell], start: usize, line: usize, options: BreakOptions) -> BreakLineInfo {
    let end = find_end(cells, start, options);
    let mut info = line_metrics(cells, start, end);
    info.line = line;
    info
}

fn find_end(cells: &[Cell], start: usize, options: BreakOptions) -> usize {
    let n = cells.len();
    let mut x = 0.0;
    let mut rollback: Option<usize> = None;
    let mut space_run = 0;

    for i in start..n {
        let cell = &cells[i];
        if i > start {
            x += cells[i - 1].advance + cells[i - 1].extra_before(cell);
        }

        if cell.is_newline() {
            return i + 1;
        }

        if cell.is_space() {
            space_run += 1;
        } else {
            space_run = 0;
        }

        let overflows = options.auto_break
            && i > start
            && space_run != 1
            && cell.right_edge(x) > options.max_width;

        if overflows {
            if cell.trailing {
                // Closing punctuation hangs rather than starting a line.
                return swallow_newline(cells, i + 1);
            }
            if let Some(end) = rollback.filter(|&end| end > start) {
                return end;
            }
            return hard_break(cells, start, i);
        }

        if let Some(next) = cells.get(i + 1) {
            if let Some(end) = opportunity(cell, next, i, options.align_right) {
                rollback = Some(end);
            }
        }
    }
    n
}

/// Break opportunity between `cells[i]` and `next`, as an exclusive line end.
fn opportunity(cell: &Cell, next: &Cell, i: usize, align_right: bool) -> Option<usize> {
    if cell.leading || next.trailing || next.is_newline() {
        return None;
    }
    if cell.is_space() {
        if next.is_space() {
            return None;
        }
        return Some(if align_right { i } else { i + 1 });
    }
    if next.is_space() {
        return None;
    }
    if cell.trailing || next.leading {
        return Some(i + 1);
    }
    let (a, b) = (cell.class.is_ideographic(), next.class.is_ideographic());
    if a && b {
        return Some(i + 1);
    }
    if a != b && (cell.break_western || next.break_western) {
        return Some(i + 1);
    }
    None
}

/// Break before `overflow`, without leaving opening punctuation at the line end.
fn hard_break(cells: &[Cell], start: usize, overflow: usize) -> usize {
    let mut end = overflow;
    while end - 1 > start && cells[end - 1].leading {
        end -= 1;
    }
    end.max(start + 1)
}

fn swallow_newline(cells: &[Cell], end: usize) -> usize {
    match cells.get(end) {
        Some(next) if next.is_newline() => end + 1,
        _ => end,
    }
}

/// Height and extents of `cells[start..end]`.
///
/// Whitespace only counts when the line has nothing else, so an empty line is one font size
/// tall.
pub fn line_metrics(cells: &[Cell], start: usize, end: usize) -> BreakLineInfo {
    let range = &cells[start..end];
    let has_ink = range.iter().any(|c| !c.class.is_whitespace());
    let mut info = BreakLineInfo {
        end,
        ..Default::default()
    };
    for cell in range.iter().filter(|c| !has_ink || !c.class.is_whitespace()) {
        info.line_height = info.line_height.max(cell.line_height);
        info.max_ascent = info.max_ascent.max(cell.ascent);
        info.max_descent = info.max_descent.max(cell.descent);
        info.max_ink_height = info.max_ink_height.max(cell.ink_height);
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(text: &str, advance: f32) -> Vec<Cell> {
        text.chars()
            .map(|ch| {
                let class = CharClass::of(ch);
                let mut cell = Cell::for_char(Some(ch), class);
                cell.w = if ch == '\n' { 0.0 } else { advance };
                cell.advance = cell.w;
                cell.line_height = advance;
                cell.ink_height = advance * 0.7;
                cell
            })
            .collect()
    }

    fn lines(cells: &[Cell], max_width: f32) -> Vec<usize> {
        let options = BreakOptions {
            max_width,
            auto_break: true,
            align_right: false,
        };
        let mut ends = Vec::new();
        let mut start = 0;
        while start < cells.len() {
            let info = scan_line(cells, start, ends.len(), options);
            ends.push(info.end);
            start = info.end;
        }
        ends
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(lines(&cells("AAAAAAAAAAAA", 10.0), 100.0), vec![10, 12]);
    }

    #[test]
    fn test_word_rollback() {
        // "hello world" at width 80: "hello " fits, "world" moves down.
        assert_eq!(lines(&cells("hello world", 10.0), 80.0), vec![6, 11]);
    }

    #[test]
    fn test_first_space_may_overflow() {
        assert_eq!(lines(&cells("abcd efg", 10.0), 40.0), vec![5, 8]);
    }

    #[test]
    fn test_newline_ends_line() {
        assert_eq!(lines(&cells("ab\ncd", 10.0), 1000.0), vec![3, 5]);
    }

    #[test]
    fn test_cjk_breaks_anywhere() {
        assert_eq!(lines(&cells("漢字漢字漢字", 10.0), 40.0), vec![4, 6]);
    }

    #[test]
    fn test_closing_punctuation_hangs() {
        assert_eq!(lines(&cells("漢字漢字。漢", 10.0), 40.0), vec![5, 6]);
    }

    #[test]
    fn test_opening_punctuation_moves_down() {
        assert_eq!(lines(&cells("漢字漢「字", 10.0), 40.0), vec![3, 5]);
    }

    #[test]
    fn test_script_transition_only_when_enabled() {
        let mut mixed = cells("ab漢cd", 10.0);
        assert_eq!(lines(&mixed, 25.0), vec![2, 4, 5]);
        for cell in &mut mixed {
            cell.break_western = true;
        }
        assert_eq!(lines(&mixed, 25.0), vec![2, 3, 5]);
    }

    #[test]
    fn test_right_align_defers_space() {
        let text = cells("hello world", 10.0);
        let options = BreakOptions {
            max_width: 80.0,
            auto_break: true,
            align_right: true,
        };
        assert_eq!(scan_line(&text, 0, 0, options).end, 5);
    }

    #[test]
    fn test_line_width_ignores_trailing_space() {
        let text = cells("ab  ", 10.0);
        assert_eq!(line_width(&text, 0, 4), 20.0);
    }

    #[test]
    fn test_italic_extra() {
        let mut text = cells("ab", 10.0);
        text[0].italic = true;
        text[0].skew = 2.0;
        let mut offsets = Vec::new();
        line_offsets(&text, 0, 2, &mut offsets);
        assert_eq!(offsets, vec![0.0, 12.0]);
    }
}
