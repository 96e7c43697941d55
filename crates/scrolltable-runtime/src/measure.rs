#![forbid(unsafe_code)]

//! View measurement seam and fallback chains.
//!
//! Layout engines report zero for hidden or not-yet-laid-out views, so
//! every measurement this crate consumes goes through a documented fallback
//! chain instead of trusting the first answer:
//!
//! - row height: sample row, else header row, else [`DEFAULT_ROW_HEIGHT_PX`]
//! - viewport height: measured, else styled, else
//!   [`DEFAULT_VIEWPORT_HEIGHT_PX`]
//!
//! Measurements are resolved once at initialization and re-resolved on an
//! explicit empty-and-refill; they are not re-read per frame.

use std::cell::Cell;

/// Row height used when neither a sample row nor the header measures to
/// anything.
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 20;

/// Viewport height used when the view is unmeasurable and carries no styled
/// height.
pub const DEFAULT_VIEWPORT_HEIGHT_PX: u32 = 400;

/// Pixel measurements of the scrollable view, supplied by the rendering
/// collaborator. A return of `0` means "the layout engine reported
/// nothing"; the resolution helpers turn that into the next fallback.
pub trait ViewMeasure {
    /// Height of a representative rendered row.
    fn sample_row_height(&self) -> u32;

    /// Height of the header row.
    fn header_height(&self) -> u32;

    /// Measured height of the scrollable viewport.
    fn viewport_height(&self) -> u32;

    /// Height the viewport is styled to, for engines that cannot measure
    /// the laid-out size. Defaults to unmeasurable.
    fn styled_viewport_height(&self) -> u32 {
        0
    }

    /// Current scroll offset of the viewport, in pixels from the top.
    fn scroll_offset(&self) -> u32;
}

impl<M: ViewMeasure + ?Sized> ViewMeasure for &M {
    fn sample_row_height(&self) -> u32 {
        (**self).sample_row_height()
    }

    fn header_height(&self) -> u32 {
        (**self).header_height()
    }

    fn viewport_height(&self) -> u32 {
        (**self).viewport_height()
    }

    fn styled_viewport_height(&self) -> u32 {
        (**self).styled_viewport_height()
    }

    fn scroll_offset(&self) -> u32 {
        (**self).scroll_offset()
    }
}

/// Resolve a usable row height: sample row, else header, else `fallback`.
#[must_use]
pub fn resolve_row_height(measure: &dyn ViewMeasure, fallback: u32) -> u32 {
    let sampled = measure.sample_row_height();
    if sampled > 0 {
        return sampled;
    }
    let header = measure.header_height();
    if header > 0 { header } else { fallback }
}

/// Resolve a usable viewport height: measured, else styled, else
/// `fallback`.
#[must_use]
pub fn resolve_viewport_height(measure: &dyn ViewMeasure, fallback: u32) -> u32 {
    let measured = measure.viewport_height();
    if measured > 0 {
        return measured;
    }
    let styled = measure.styled_viewport_height();
    if styled > 0 { styled } else { fallback }
}

/// A `ViewMeasure` with fixed geometry and a settable scroll offset.
///
/// Useful for headless embedders and tests; interior mutability on the
/// offset lets the same handle be shared with a driver that holds it by
/// value.
#[derive(Debug, Clone, Default)]
pub struct StaticMeasure {
    /// Reported sample-row height.
    pub sample_row_height: u32,
    /// Reported header height.
    pub header_height: u32,
    /// Reported viewport height.
    pub viewport_height: u32,
    /// Reported styled viewport height.
    pub styled_viewport_height: u32,
    scroll_offset: Cell<u32>,
}

impl StaticMeasure {
    /// A measure reporting the given row and viewport heights directly.
    #[must_use]
    pub fn new(row_height: u32, viewport_height: u32) -> Self {
        Self {
            sample_row_height: row_height,
            header_height: 0,
            viewport_height,
            styled_viewport_height: 0,
            scroll_offset: Cell::new(0),
        }
    }

    /// Move the simulated scroll position.
    pub fn set_scroll_offset(&self, px: u32) {
        self.scroll_offset.set(px);
    }
}

impl ViewMeasure for StaticMeasure {
    fn sample_row_height(&self) -> u32 {
        self.sample_row_height
    }

    fn header_height(&self) -> u32 {
        self.header_height
    }

    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn styled_viewport_height(&self) -> u32 {
        self.styled_viewport_height
    }

    fn scroll_offset(&self) -> u32 {
        self.scroll_offset.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_height_prefers_sample() {
        let m = StaticMeasure {
            sample_row_height: 18,
            header_height: 24,
            ..StaticMeasure::default()
        };
        assert_eq!(resolve_row_height(&m, DEFAULT_ROW_HEIGHT_PX), 18);
    }

    #[test]
    fn row_height_falls_back_to_header_then_default() {
        let header_only = StaticMeasure {
            header_height: 24,
            ..StaticMeasure::default()
        };
        assert_eq!(resolve_row_height(&header_only, DEFAULT_ROW_HEIGHT_PX), 24);

        let nothing = StaticMeasure::default();
        assert_eq!(
            resolve_row_height(&nothing, DEFAULT_ROW_HEIGHT_PX),
            DEFAULT_ROW_HEIGHT_PX
        );
    }

    #[test]
    fn viewport_height_falls_back_to_styled_then_default() {
        let styled_only = StaticMeasure {
            styled_viewport_height: 300,
            ..StaticMeasure::default()
        };
        assert_eq!(
            resolve_viewport_height(&styled_only, DEFAULT_VIEWPORT_HEIGHT_PX),
            300
        );

        let nothing = StaticMeasure::default();
        assert_eq!(
            resolve_viewport_height(&nothing, DEFAULT_VIEWPORT_HEIGHT_PX),
            DEFAULT_VIEWPORT_HEIGHT_PX
        );
    }

    #[test]
    fn static_measure_scroll_offset_is_settable() {
        let m = StaticMeasure::new(20, 100);
        assert_eq!(m.scroll_offset(), 0);
        m.set_scroll_offset(60);
        assert_eq!(m.scroll_offset(), 60);
    }
}
