//! Frame import/export for offline inspection and device upload.
//!
//! A single frame travels as one CSV line of 625 intensities. A recorded
//! session travels as a JSON timeline of frames with per-frame durations.

use crate::constants::*;
use crate::error::{EyesError, Result};
use crate::raster::{DisplaySink, Frame};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[inline]
fn lit_level(p: u8) -> u16 {
    if p != 0 {
        EXPORT_LIT_LEVEL
    } else {
        0
    }
}

/// One CSV line, row-major, lit pixels at full device intensity.
pub fn frame_to_csv_line(frame: &Frame) -> String {
    let values: Vec<String> = frame
        .pixels()
        .iter()
        .map(|&p| lit_level(p).to_string())
        .collect();
    values.join(",")
}

/// Parse a line produced by [`frame_to_csv_line`]; any non-zero value is lit.
pub fn parse_csv_line(line: &str) -> Result<Frame> {
    let values = line
        .trim()
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<u16>()
                .map_err(|_| EyesError::Pixel(v.trim().to_string()))
        })
        .collect::<Result<Vec<u16>>>()?;
    let lit: Vec<u8> = values.iter().map(|&v| u8::from(v != 0)).collect();
    Frame::from_pixels(&lit)
}

fn default_frame_ms() -> u32 {
    EXPORT_DEFAULT_FRAME_MS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineFrame {
    #[serde(default = "default_frame_ms")]
    pub duration_ms: u32,
    /// Rows of intensities, top to bottom.
    pub pixels: Vec<Vec<u16>>,
}

impl TimelineFrame {
    pub fn from_frame(frame: &Frame, duration_ms: u32) -> Self {
        let pixels = frame
            .pixels()
            .chunks(MATRIX_WIDTH)
            .map(|row| row.iter().map(|&p| lit_level(p)).collect())
            .collect();
        Self {
            duration_ms,
            pixels,
        }
    }

    pub fn to_frame(&self) -> Result<Frame> {
        if self.pixels.len() != MATRIX_HEIGHT {
            return Err(EyesError::FrameSize {
                expected: MATRIX_PIXELS,
                got: self.pixels.iter().map(Vec::len).sum(),
            });
        }
        let mut flat = Vec::with_capacity(MATRIX_PIXELS);
        for row in &self.pixels {
            if row.len() != MATRIX_WIDTH {
                return Err(EyesError::FrameSize {
                    expected: MATRIX_PIXELS,
                    got: self.pixels.iter().map(Vec::len).sum(),
                });
            }
            flat.extend(row.iter().map(|&v| u8::from(v != 0)));
        }
        Frame::from_pixels(&flat)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub frames: Vec<TimelineFrame>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: &Frame, duration_ms: u32) {
        self.frames.push(TimelineFrame::from_frame(frame, duration_ms));
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms as u64).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Sink that appends every submitted frame to a [`Timeline`].
pub struct TimelineRecorder {
    timeline: Timeline,
    frame_ms: u32,
    released: bool,
}

impl TimelineRecorder {
    pub fn new(frame_ms: u32) -> Self {
        Self {
            timeline: Timeline::new(),
            frame_ms,
            released: false,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl DisplaySink for TimelineRecorder {
    fn submit(&mut self, frame: &Frame) -> Result<()> {
        if self.released {
            return Err(EyesError::Sink("recorder already released".into()));
        }
        self.timeline.push(frame, self.frame_ms);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        log::debug!("[export] recorder released with {} frames", self.timeline.len());
        Ok(())
    }
}
