//! Native simulator contract.
//!
//! `DoomEnv` drives any engine exposing this life cycle: load a scenario
//! configuration, initialize, run episodes by submitting button vectors for a
//! number of tics, and read back the screen buffer plus scenario variables.

use crate::{EnvError, Result};
use std::path::Path;

/// Pixel layout of a screen buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenFormat {
    /// Three planes, one per channel: all red, then all green, then all blue
    Crcgcb,
    /// Interleaved `R G B` bytes per pixel
    Rgb24,
    /// One luminance byte per pixel
    Gray8,
}

impl ScreenFormat {
    /// Number of channels per pixel
    pub fn channels(self) -> usize {
        match self {
            ScreenFormat::Crcgcb | ScreenFormat::Rgb24 => 3,
            ScreenFormat::Gray8 => 1,
        }
    }
}

/// Raw frame produced by the simulator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenBuffer {
    pub format: ScreenFormat,
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl ScreenBuffer {
    /// Create a buffer, checking `data` against the declared dimensions
    pub fn new(format: ScreenFormat, width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = format.channels() * height * width;
        if data.len() != expected {
            return Err(EnvError::ShapeMismatch {
                expected: vec![expected],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            format,
            width,
            height,
            data,
        })
    }

    /// Shape in the buffer's native axis order
    pub fn shape(&self) -> [usize; 3] {
        match self.format {
            ScreenFormat::Crcgcb => [3, self.height, self.width],
            ScreenFormat::Rgb24 => [self.height, self.width, 3],
            ScreenFormat::Gray8 => [self.height, self.width, 1],
        }
    }
}

/// Snapshot of a running episode
#[derive(Clone, Debug)]
pub struct GameState {
    /// Tic counter within the episode
    pub number: u64,
    pub screen_buffer: ScreenBuffer,
    /// Values of the scenario's declared game variables, in declaration order
    pub game_variables: Vec<f64>,
}

/// Native interface of a simulator.
///
/// Calls block until the engine responds. Implementations own whatever
/// process or window they create and release it in `close`.
pub trait Simulator: Send {
    /// Read the scenario configuration file
    fn load_config(&mut self, path: &Path) -> Result<()>;

    /// Show or hide the engine window. Takes effect at `init`.
    fn set_window_visible(&mut self, visible: bool);

    /// Start the engine. Must follow `load_config`.
    fn init(&mut self) -> Result<()>;

    /// Discard the current episode and start a new one
    fn new_episode(&mut self) -> Result<()>;

    /// Hold the given buttons for `tics` tics and return the accumulated reward
    fn make_action(&mut self, action: &[f64], tics: u32) -> Result<f64>;

    /// Current state, or `None` once the episode has finished
    fn get_state(&self) -> Option<GameState>;

    fn is_episode_finished(&self) -> bool;

    /// Number of buttons the scenario declares
    fn available_buttons_size(&self) -> usize;

    /// Shut the engine down
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_buffer_shape() {
        let buf = ScreenBuffer::new(ScreenFormat::Crcgcb, 4, 2, vec![0; 24]).unwrap();
        assert_eq!(buf.shape(), [3, 2, 4]);

        let buf = ScreenBuffer::new(ScreenFormat::Gray8, 4, 2, vec![0; 8]).unwrap();
        assert_eq!(buf.shape(), [2, 4, 1]);
    }

    #[test]
    fn test_screen_buffer_rejects_bad_length() {
        let err = ScreenBuffer::new(ScreenFormat::Rgb24, 4, 2, vec![0; 8]).unwrap_err();
        assert!(matches!(err, EnvError::ShapeMismatch { .. }));
    }
}
