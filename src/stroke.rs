// The in-progress stroke and its hand-off to permanent ink.
// Idle --down--> Active --move*--> Active --up/cancel--> Idle (+ one StrokeCommit)

use crate::types::{Color, Point};

/// Finished stroke, ready to be baked into the persistent canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeCommit {
    pub path: Vec<Point>, // every point in the order it was visited, start..=end
    pub color: Color,
    pub start: Point,
    pub end: Point,
}

/// What the compositor needs to paint the live overlay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveStroke {
    pub path: Vec<Point>,
    pub color: Option<Color>, // None while idle
}

impl LiveStroke {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

#[derive(Debug)]
pub struct StrokeModel {
    path: Vec<Point>,     // non-empty only while active
    active: bool,
    start: Point,
    stroke_color: Color,  // snapshot taken at down
    current_color: Color, // what the palette says right now
}

impl StrokeModel {
    pub fn new(initial_color: Color) -> Self {
        Self {
            path: Vec::new(),
            active: false,
            start: Point::default(),
            stroke_color: initial_color,
            current_color: initial_color,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_color(&self) -> Color {
        self.current_color
    }

    /// Start a new stroke. Any stale stroke (missed up/cancel) is dropped.
    pub fn on_down(&mut self, point: Point) {
        self.path.clear();
        self.path.push(point);
        self.start = point;
        self.stroke_color = self.current_color;
        self.active = true;
    }

    pub fn on_move(&mut self, point: Point) {
        if !self.active {
            return;
        }
        self.path.push(point);
    }

    /// Close the stroke at `point`. Returns `None` when nothing was in progress.
    pub fn on_up_or_cancel(&mut self, point: Point) -> Option<StrokeCommit> {
        if !self.active {
            return None;
        }
        self.path.push(point);

        let commit = StrokeCommit {
            path: std::mem::take(&mut self.path),
            color: self.stroke_color,
            start: self.start,
            end: point,
        };
        self.active = false;
        Some(commit)
    }

    /// Future strokes use `color`; a stroke already in progress keeps its own.
    pub fn set_color(&mut self, color: Color) {
        self.current_color = color;
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.active = false;
    }

    /// Copy of the in-progress path for the render side.
    pub fn live(&self) -> LiveStroke {
        if !self.active {
            return LiveStroke::default();
        }
        LiveStroke {
            path: self.path.clone(),
            color: Some(self.stroke_color),
        }
    }
}
