//! Frame Hole Drilling
//!
//! Drills one nail hole per frame position before winding. The frame turns on
//! the rotation axis exactly as during winding; the spindle axis plunges and
//! retracts the drill.

use crate::error::{ThreadArtError, ThreadArtResult};
use threadkit_settings::{HoleDrillingSettings, MachineSettings};

/// Generator for the frame drilling program
#[derive(Debug, Clone)]
pub struct HoleDrillingGenerator {
    drilling: HoleDrillingSettings,
    rotation_axis: String,
    spindle_axis: String,
    nails_quantity: usize,
}

impl HoleDrillingGenerator {
    pub fn new(
        drilling: HoleDrillingSettings,
        machine: &MachineSettings,
        nails_quantity: usize,
    ) -> ThreadArtResult<Self> {
        if nails_quantity == 0 {
            return Err(ThreadArtError::InvalidParameters(
                "nails quantity must be > 0".to_string(),
            ));
        }
        drilling.validate()?;

        Ok(Self {
            drilling,
            rotation_axis: machine.rotation_axis.clone(),
            spindle_axis: machine.spindle_axis.clone(),
            nails_quantity,
        })
    }

    /// Generate the drilling program, one line per entry
    pub fn generate(&self) -> Vec<String> {
        let d = &self.drilling;
        let mut lines = Vec::with_capacity(1 + 3 * self.nails_quantity);
        lines.push(format!("G28 {}0 {}0", self.spindle_axis, self.rotation_axis));

        for nail in 0..self.nails_quantity {
            lines.push(format!(
                "G01 {}{} F{} ; Move to nail {}",
                self.rotation_axis, nail, d.rotation_feed_rate, nail
            ));
            lines.push(format!(
                "G01 {}{:.2} F{} ; Drill hole at nail {}",
                self.spindle_axis, d.drill_depth, d.plunge_feed_rate, nail
            ));
            lines.push(format!(
                "G01 {}{:.2} F{} ; Retract drill",
                self.spindle_axis, d.retract_position, d.retract_feed_rate
            ));
        }

        lines
    }
}
