// this_file: crates/glyphmesh-core/src/diagnostics.rs

//! Build diagnostics helpers used for structured debug logging.

use crate::font::FontTable;
use crate::types::{Alignment, SlotId, TextStyle};
use log::{debug, log_enabled, Level};

/// Lightweight snapshot of one mesh rebuild.
#[derive(Debug)]
pub struct BuildDiagnostics<'a> {
    slot: SlotId,
    font: &'a str,
    codepoints: usize,
    size: f32,
    scale: f32,
    alignment: &'static str,
    color: [u8; 4],
}

impl<'a> BuildDiagnostics<'a> {
    /// Capture the diagnostic snapshot for a rebuild of `slot`.
    pub fn new(
        slot: SlotId,
        font: &'a FontTable,
        style: &TextStyle,
        scale: f32,
        codepoints: usize,
    ) -> Self {
        Self {
            slot,
            font: font.name(),
            codepoints,
            size: style.size,
            scale,
            alignment: match style.alignment {
                Alignment::Left => "left",
                Alignment::Center => "center",
                Alignment::Right => "right",
            },
            color: style.color.to_array(),
        }
    }

    /// Emit the diagnostic snapshot at debug level when logging is enabled.
    pub fn log(&self) {
        if log_enabled!(target: "glyphmesh::layout", Level::Debug) {
            debug!(
                target: "glyphmesh::layout",
                "slot={slot} font={font} codepoints={codepoints} size={size:.2} scale={scale:.4} align={align} color={r:02x}{g:02x}{b:02x}{a:02x}",
                slot = self.slot.index(),
                font = self.font,
                codepoints = self.codepoints,
                size = self.size,
                scale = self.scale,
                align = self.alignment,
                r = self.color[0],
                g = self.color[1],
                b = self.color[2],
                a = self.color[3],
            );
        }
    }
}
