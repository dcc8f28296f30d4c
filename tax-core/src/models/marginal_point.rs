use serde::{Deserialize, Serialize};

/// The income or price at which a schedule's marginal and effective behaviour
/// meet, with the value of the analysed curve there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginalPoint {
    pub x: f64,
    pub y: f64,
}

impl MarginalPoint {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self { x, y }
    }
}
