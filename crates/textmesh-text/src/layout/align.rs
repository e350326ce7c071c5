//! Alignment inside the container and slot placement.

use glam::{Vec2, vec2};
use textmesh_core::geometry::Size;
use textmesh_core::profiling::profile_function;

use crate::style::{HorizontalAlign, VerticalAlign};
use crate::unit::{CharStream, CharUnit, UnitContent};

use super::{LayoutResult, LineInfo};

/// Shift every line by `(inner_width - line.width) * factor`.
pub fn align_horizontal(
    units: &mut [CharUnit],
    lines: &mut [LineInfo],
    inner_width: f32,
    align: HorizontalAlign,
) {
    let factor = align.factor();
    if factor == 0.0 {
        return;
    }
    profile_function!();
    for line in lines {
        let offset = (inner_width - line.width) * factor;
        line.x_offset = offset;
        for unit in &mut units[line.range.clone()] {
            unit.x += offset;
        }
    }
}

/// Shift the whole block by `(inner_height - content_height) * factor`. Returns the offset.
pub fn align_vertical(
    units: &mut [CharUnit],
    lines: &mut [LineInfo],
    inner_height: f32,
    content_height: f32,
    align: VerticalAlign,
) -> f32 {
    let factor = align.factor();
    if factor == 0.0 {
        return 0.0;
    }
    profile_function!();
    let offset = (inner_height - content_height) * factor;
    for line in lines.iter_mut() {
        line.top += offset;
    }
    for unit in units {
        unit.y += offset;
        unit.line_top += offset;
    }
    offset
}

/// Offset from the anchor point to the top left corner of a box of `size`.
pub fn anchor_origin(size: Size<f32>, anchor: Vec2) -> Vec2 {
    vec2(-size.width * anchor.x, -size.height * anchor.y)
}

/// Where an inline slot should be drawn, relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPlacement {
    /// Index into [`CharStream::slots`].
    pub slot: usize,
    pub unit: usize,
    /// Bottom left corner of the slot box.
    pub position: Vec2,
    pub size: Size<f32>,
    pub scale: f32,
}

/// Positions of every slot in `stream`. The slot box sits on its line's baseline.
pub fn place_slots(stream: &CharStream, result: &LayoutResult) -> Vec<SlotPlacement> {
    stream
        .units
        .iter()
        .enumerate()
        .filter_map(|(i, unit)| {
            let UnitContent::Slot(slot) = unit.content else {
                return None;
            };
            let descent = result.lines.get(unit.line).map_or(0.0, |l| l.max_descent);
            let size = Size::new(unit.metrics.w, unit.metrics.h);
            Some(SlotPlacement {
                slot,
                unit: i,
                position: vec2(unit.x, unit.y - descent) + result.origin,
                size,
                scale: result.scale,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(range: std::ops::Range<usize>, width: f32) -> LineInfo {
        LineInfo {
            range,
            width,
            height: 10.0,
            ..Default::default()
        }
    }

    fn units(n: usize) -> Vec<CharUnit> {
        (0..n)
            .map(|i| CharUnit {
                index: i,
                x: i as f32 * 10.0,
                y: 10.0,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_center_lines() {
        let mut units = units(3);
        let mut lines = vec![line(0..2, 20.0), line(2..3, 10.0)];
        align_horizontal(&mut units, &mut lines, 40.0, HorizontalAlign::Center);
        assert_eq!(lines[0].x_offset, 10.0);
        assert_eq!(lines[1].x_offset, 15.0);
        assert_eq!(units[0].x, 10.0);
        assert_eq!(units[2].x, 35.0);
    }

    #[test]
    fn test_left_is_noop() {
        let mut units = units(2);
        let mut lines = vec![line(0..2, 20.0)];
        align_horizontal(&mut units, &mut lines, 40.0, HorizontalAlign::Left);
        assert_eq!(units[1].x, 10.0);
    }

    #[test]
    fn test_bottom_align() {
        let mut units = units(2);
        let mut lines = vec![line(0..2, 20.0)];
        let offset = align_vertical(&mut units, &mut lines, 50.0, 10.0, VerticalAlign::Bottom);
        assert_eq!(offset, 40.0);
        assert_eq!(lines[0].top, 40.0);
        assert_eq!(units[0].y, 50.0);
    }

    #[test]
    fn test_anchor_origin() {
        let origin = anchor_origin(Size::new(100.0, 40.0), vec2(0.5, 0.5));
        assert_eq!(origin, vec2(-50.0, -20.0));
        assert_eq!(anchor_origin(Size::new(100.0, 40.0), Vec2::ZERO), Vec2::ZERO);
    }
}
