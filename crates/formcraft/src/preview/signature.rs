use std::fmt::Write as _;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One pen-down to pen-up gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

/// Drawing surface for SIGNATURE fields. Strokes stay local until submit,
/// where a non-empty pad is serialized with [`SignaturePad::to_data_url`].
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePad {
    strokes: Vec<Stroke>,
    width: u32,
    height: u32,
    pen_color: String,
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(500, 200)
    }
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            strokes: Vec::new(),
            width,
            height,
            pen_color: "black".to_string(),
        }
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.strokes.push(Stroke {
            points: vec![point],
        });
    }

    /// Extends the current stroke, or starts one when the pad is empty.
    pub fn extend_stroke(&mut self, point: Point) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.points.push(point),
            None => self.begin_stroke(point),
        }
    }

    pub fn push_stroke(&mut self, stroke: Stroke) {
        if !stroke.points.is_empty() {
            self.strokes.push(stroke);
        }
    }

    /// Drops the most recent stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for stroke in &self.strokes {
            match stroke.points.as_slice() {
                [] => {}
                [dot] => {
                    let _ = write!(
                        svg,
                        r#"<circle cx="{:.1}" cy="{:.1}" r="1.5" fill="{}"/>"#,
                        dot.x, dot.y, self.pen_color
                    );
                }
                [first, rest @ ..] => {
                    let mut path = format!("M{:.1} {:.1}", first.x, first.y);
                    for point in rest {
                        let _ = write!(path, " L{:.1} {:.1}", point.x, point.y);
                    }
                    let _ = write!(
                        svg,
                        r#"<path d="{}" fill="none" stroke="{}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"/>"#,
                        path, self.pen_color
                    );
                }
            }
        }
        svg.push_str("</svg>");
        svg
    }

    /// `data:image/svg+xml;base64,...` of the current drawing.
    pub fn to_data_url(&self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.to_svg()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed() -> SignaturePad {
        let mut pad = SignaturePad::new(100, 40);
        pad.begin_stroke(Point::new(1.0, 1.0));
        pad.extend_stroke(Point::new(10.0, 5.0));
        pad.begin_stroke(Point::new(20.0, 20.0));
        pad
    }

    #[test]
    fn undo_drops_only_the_last_stroke() {
        let mut pad = signed();
        let dropped = pad.undo().expect("stroke");
        assert_eq!(dropped.points, vec![Point::new(20.0, 20.0)]);
        assert_eq!(pad.stroke_count(), 1);
        pad.clear();
        assert!(pad.is_empty());
        assert!(pad.undo().is_none());
    }

    #[test]
    fn svg_has_one_element_per_stroke() {
        let svg = signed().to_svg();
        assert!(svg.contains(r#"<path d="M1.0 1.0 L10.0 5.0""#));
        assert!(svg.contains(r#"<circle cx="20.0" cy="20.0""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn data_url_decodes_back_to_svg() {
        let pad = signed();
        let url = pad.to_data_url();
        let encoded = url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("svg data url");
        let decoded = STANDARD.decode(encoded).expect("base64");
        assert_eq!(String::from_utf8(decoded).expect("utf8"), pad.to_svg());
    }
}
