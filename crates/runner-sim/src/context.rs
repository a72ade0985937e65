//! Per-tick simulation context

/// State handed to every tick instead of ambient globals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    /// Seconds elapsed since the previous tick
    pub delta_time: f32,
    /// Application-wide pause; freezes the jump grounding decay
    pub audio_paused: bool,
}

impl SimulationContext {
    /// Running context advancing by `delta_time`
    pub fn running(delta_time: f32) -> Self {
        Self {
            delta_time,
            audio_paused: false,
        }
    }

    /// Paused context: no time passes
    pub fn paused() -> Self {
        Self {
            delta_time: 0.0,
            audio_paused: true,
        }
    }
}
