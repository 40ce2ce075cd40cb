//! Stroke font collaborator
//!
//! Glyph layout is owned by the board's font engine; the shape extraction
//! layer only receives primitives through a `GlyphSink`.

use super::items::Text;
use crate::draw::polygon::BoardPoint;

/// Receives glyph primitives in board units
pub trait GlyphSink {
    fn stroke(&mut self, a: BoardPoint, b: BoardPoint);
    fn triangle(&mut self, a: BoardPoint, b: BoardPoint, c: BoardPoint);
}

pub trait StrokeFont: Sync {
    fn draw_text(&self, text: &Text, sink: &mut dyn GlyphSink);
}

/// Replays the strokes and fills a `Text` already carries
#[derive(Debug, Clone, Copy, Default)]
pub struct LaidOutText;

impl StrokeFont for LaidOutText {
    fn draw_text(&self, text: &Text, sink: &mut dyn GlyphSink) {
        for stroke in &text.strokes {
            match stroke.len() {
                0 => {}
                1 => sink.stroke(stroke[0], stroke[0]),
                _ => {
                    for pair in stroke.windows(2) {
                        sink.stroke(pair[0], pair[1]);
                    }
                }
            }
        }
        for [a, b, c] in &text.fills {
            sink.triangle(*a, *b, *c);
        }
    }
}
