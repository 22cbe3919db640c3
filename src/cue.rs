use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

/// Colors the particle renderer keys off, packed 0xRRGGBB.
pub const CUE_SUCCESS: u32 = 0x00ff00;
pub const CUE_FAILURE: u32 = 0xff0000;

/// The one piece of state shared between the recognition loop and the
/// render loop. Single writer (recognition), single reader (render);
/// last write wins, no coordination.
#[derive(Clone, Debug)]
pub struct SharedCue(Arc<AtomicU32>);

impl SharedCue {
    /// Starts on the success color, like the particle field at launch.
    pub fn new() -> Self {
        Self(Arc::new(AtomicU32::new(CUE_SUCCESS)))
    }

    pub fn set(&self, rgb: u32) {
        self.0.store(rgb, Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for SharedCue {
    fn default() -> Self {
        Self::new()
    }
}
