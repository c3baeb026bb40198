//! Thread Winding G-code
//!
//! Encodes an edge sequence as motion for a rotary thread winding machine.
//! The frame turns on the rotation axis, one unit per nail; the needle axis
//! moves the thread in and out so it can be hooked around each nail.
//!
//! Per edge the machine approaches the target nail on the shortest way round
//! the frame, retracts the needle, rotates past the nail by the nail offset
//! to wrap it, then re-engages the needle.

use crate::error::{ThreadArtError, ThreadArtResult};
use crate::line_cache::LineGeometryCache;
use threadkit_core::{format_length, Edge, Nail, PixelScale};
use threadkit_settings::MachineSettings;

/// Builds thread winding G-code for a generated path list
#[derive(Debug, Clone)]
pub struct GCodeGenerator {
    machine: MachineSettings,
    nails: Vec<Nail>,
    scale: PixelScale,
}

impl GCodeGenerator {
    pub fn new(machine: MachineSettings, nails: Vec<Nail>, scale: PixelScale) -> Self {
        Self {
            machine,
            nails,
            scale,
        }
    }

    fn nails_quantity(&self) -> usize {
        self.nails.len()
    }

    /// Emit the motion program as individual lines
    pub fn generate_lines(
        &self,
        paths: &[Edge],
        cache: &LineGeometryCache,
    ) -> ThreadArtResult<Vec<String>> {
        let m = &self.machine;
        let mut lines = vec![format!(
            "G28 {}{} {}0 {}0",
            m.needle_axis, m.needle_home, m.spindle_axis, m.rotation_axis
        )];

        let Some(first) = paths.first() else {
            return Ok(lines);
        };

        lines.push(format!(
            "G01 {}{:.2} F{} ; Move to nail {}",
            m.rotation_axis, first.starting_nail as f64, m.feed_rate, first.starting_nail
        ));
        lines.push("M0 ; Pause to attach thread".to_string());

        let mut position = first.starting_nail as f64;
        for (k, edge) in paths.iter().enumerate() {
            lines.push(self.edge_comment(k + 1, edge, cache)?);
            position = self.approach(&mut lines, edge, position)?;
            position = self.wrap(&mut lines, edge.ending_nail);
        }

        Ok(lines)
    }

    /// Emit the motion program as one newline-terminated string with a header
    pub fn generate_program(
        &self,
        paths: &[Edge],
        cache: &LineGeometryCache,
        thread_length_mm: f64,
    ) -> ThreadArtResult<String> {
        let units = self.machine.display_units;
        let mut gcode = String::new();

        gcode.push_str("; Thread Art Winding G-code\n");
        gcode.push_str(&format!(
            "; Generated: {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        gcode.push_str(&format!("; Nails: {}\n", self.nails_quantity()));
        gcode.push_str(&format!("; Edges: {}\n", paths.len()));
        gcode.push_str(&format!(
            "; Thread length: {} {}\n",
            format_length(thread_length_mm, units),
            units.unit_label()
        ));
        gcode.push_str(";\n");

        for line in self.generate_lines(paths, cache)? {
            gcode.push_str(&line);
            gcode.push('\n');
        }
        Ok(gcode)
    }

    fn edge_comment(
        &self,
        number: usize,
        edge: &Edge,
        cache: &LineGeometryCache,
    ) -> ThreadArtResult<String> {
        let units = self.machine.display_units;
        let from = self.nail(edge.starting_nail)?;
        let to = self.nail(edge.ending_nail)?;
        let line = cache
            .line_between(edge.starting_nail, edge.ending_nail)
            .ok_or_else(|| {
                ThreadArtError::InternalInconsistency(format!("no cached line for edge {}", edge))
            })?;

        Ok(format!(
            "; Edge {}: nail {} (X{} Y{}) -> nail {} (X{} Y{}), {} {}",
            number,
            edge.starting_nail,
            format_length(self.scale.to_mm(f64::from(from.x)), units),
            format_length(self.scale.to_mm(f64::from(from.y)), units),
            edge.ending_nail,
            format_length(self.scale.to_mm(f64::from(to.x)), units),
            format_length(self.scale.to_mm(f64::from(to.y)), units),
            format_length(self.scale.line_length_mm(line.len()), units),
            units.unit_label()
        ))
    }

    /// Rotate to just before the target nail and return the new axis position
    fn approach(&self, lines: &mut Vec<String>, edge: &Edge, position: f64) -> ThreadArtResult<f64> {
        let m = &self.machine;
        let n = self.nails_quantity() as i64;
        let from = edge.starting_nail as i64;
        let to = edge.ending_nail as i64;
        if from >= n || to >= n {
            return Err(ThreadArtError::InvalidParameters(format!(
                "edge {} references a nail outside 0..{}",
                edge, n
            )));
        }

        let delta = shortest_delta(from, to, n);
        let target = to as f64 - m.nail_offset;

        if (0..n).contains(&(from + delta)) {
            lines.push(format!(
                "G01 {}{:.2} F{} ; Move to nail {}",
                m.rotation_axis, target, m.feed_rate, to
            ));
        } else {
            // Crossing nail 0: move relatively, then renumber the axis
            let unwrapped = (from + delta) as f64 - m.nail_offset;
            lines.push("G91 ; Relative positioning".to_string());
            lines.push(format!(
                "G01 {}{:.2} F{} ; Move by {} nails to nail {}",
                m.rotation_axis,
                unwrapped - position,
                m.feed_rate,
                delta,
                to
            ));
            lines.push("G90 ; Absolute positioning".to_string());
            lines.push(format!(
                "G92 {}{:.2} ; Set position to nail {}",
                m.rotation_axis, target, to
            ));
        }
        Ok(target)
    }

    /// Hook the thread around `nail` and return the new axis position
    fn wrap(&self, lines: &mut Vec<String>, nail: usize) -> f64 {
        let m = &self.machine;
        let past = nail as f64 + m.nail_offset;

        lines.push(format!(
            "G01 {}{:.2} F{} ; Retract needle",
            m.needle_axis, m.needle_retract, m.needle_feed_rate
        ));
        lines.push(format!(
            "G01 {}{:.2} F{} ; Wrap nail {}",
            m.rotation_axis, past, m.wrap_feed_rate, nail
        ));
        lines.push(format!(
            "G01 {}{:.2} F{} ; Engage needle",
            m.needle_axis, m.needle_engage, m.needle_feed_rate
        ));
        past
    }

    fn nail(&self, index: usize) -> ThreadArtResult<Nail> {
        self.nails.get(index).copied().ok_or_else(|| {
            ThreadArtError::InvalidParameters(format!(
                "nail {} is outside 0..{}",
                index,
                self.nails_quantity()
            ))
        })
    }
}

/// Signed nail delta from `from` to `to` going the short way round,
/// in `(-n/2, n/2]`
pub fn shortest_delta(from: i64, to: i64, n: i64) -> i64 {
    let forward = (to - from).rem_euclid(n);
    if forward > n / 2 {
        forward - n
    } else {
        forward
    }
}
