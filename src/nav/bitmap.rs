//! Walkability bitmap decoding
//!
//! The map asset is an image whose red channel encodes traversability:
//! a zero intensity means open ground, anything else is blocked. Existing
//! map assets depend on this polarity.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::NavError;

/// Immutable 2D grid of intensities decoded from the map asset
#[derive(Debug, Clone, PartialEq)]
pub struct WalkabilityBitmap {
    width: u32,
    height: u32,
    /// Row-major red channel values
    intensity: Vec<u8>,
}

impl WalkabilityBitmap {
    /// Intensity that marks a walkable pixel
    pub const OPEN: u8 = 0;

    /// Build a bitmap by evaluating `f(u, v)` for every pixel.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::EmptyBitmap`] if either dimension is zero
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> u8,
    ) -> Result<Self, NavError> {
        if width == 0 || height == 0 {
            return Err(NavError::EmptyBitmap);
        }
        let mut intensity = Vec::with_capacity(width as usize * height as usize);
        for v in 0..height {
            for u in 0..width {
                intensity.push(f(u, v));
            }
        }
        Ok(Self {
            width,
            height,
            intensity,
        })
    }

    /// A bitmap where every pixel is walkable
    ///
    /// # Errors
    ///
    /// Returns [`NavError::EmptyBitmap`] if either dimension is zero
    pub fn all_open(width: u32, height: u32) -> Result<Self, NavError> {
        Self::from_fn(width, height, |_, _| Self::OPEN)
    }

    /// Take the red channel of a decoded image
    ///
    /// # Errors
    ///
    /// Returns [`NavError::EmptyBitmap`] for a zero-sized image
    pub fn from_image(img: &image::DynamicImage) -> Result<Self, NavError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(NavError::EmptyBitmap);
        }
        let intensity = rgba.pixels().map(|p| p.0[0]).collect();
        Ok(Self {
            width,
            height,
            intensity,
        })
    }

    /// Decode encoded image bytes (PNG)
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded or the image is empty
    pub fn decode(bytes: &[u8]) -> Result<Self, NavError> {
        let img = image::load_from_memory(bytes).map_err(|e| NavError::Decode(e.to_string()))?;
        Self::from_image(&img)
    }

    /// Read and decode a map file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let bytes = std::fs::read(path).map_err(|e| NavError::Io(e.to_string()))?;
        Self::decode(&bytes)
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw intensity at a pixel, `None` outside the bitmap
    #[must_use]
    pub fn intensity(&self, u: i64, v: i64) -> Option<u8> {
        if u < 0 || v < 0 || u >= i64::from(self.width) || v >= i64::from(self.height) {
            return None;
        }
        let idx = v as usize * self.width as usize + u as usize;
        self.intensity.get(idx).copied()
    }

    /// Whether the pixel exists and carries the open intensity
    #[must_use]
    pub fn is_open(&self, u: i64, v: i64) -> bool {
        self.intensity(u, v) == Some(Self::OPEN)
    }

    /// Fraction of pixels that are walkable
    #[must_use]
    pub fn open_ratio(&self) -> f32 {
        let open = self.intensity.iter().filter(|&&i| i == Self::OPEN).count();
        open as f32 / self.intensity.len() as f32
    }
}

/// A map decode running on a background thread
#[derive(Debug)]
pub struct PendingBitmap {
    path: PathBuf,
    rx: Receiver<Result<WalkabilityBitmap, NavError>>,
}

impl PendingBitmap {
    /// Start decoding `path` off the frame loop
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            // The receiver may already be gone if the owner shut down.
            let _ = tx.send(WalkabilityBitmap::open(&worker_path));
        });
        Self { path, rx }
    }

    /// Path being decoded
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check; `None` while the decode is still running
    pub fn try_take(&self) -> Option<Result<WalkabilityBitmap, NavError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(NavError::LoaderDisconnected)),
        }
    }

    /// Block until the decode finishes
    ///
    /// # Errors
    ///
    /// Returns the decode error, or [`NavError::LoaderDisconnected`]
    pub fn wait(self) -> Result<WalkabilityBitmap, NavError> {
        self.rx.recv().map_err(|_| NavError::LoaderDisconnected)?
    }
}
