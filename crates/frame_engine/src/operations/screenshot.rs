//! One-shot screenshot capture
//!
//! Pixels are read back into a pooled byte buffer and written as PNG, either
//! inline or on a worker thread that releases the buffer when done. Worker
//! threads are tracked in [`ScreenshotWorkers`] so shutdown can wait for them.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::pool::{ByteBufferPool, Poolable, SchedOpsPool};
use crate::scheduler::{FrameContext, OperationError, OperationState, ScheduledOperation};

/// Source of rendered frames
pub trait FrameGrabber {
    /// Width and height of the current frame in pixels
    fn frame_size(&self) -> (u32, u32);

    /// Copy the current frame as tightly packed RGBA8 rows into `pixels`
    ///
    /// `pixels` holds exactly `width * height * 4` bytes.
    fn read_pixels(&mut self, pixels: &mut [u8]) -> Result<(), OperationError>;
}

/// Handles of screenshot encoding threads that have not been joined yet
///
/// Shared by every screenshot from the same [`SchedOpsPool`].
#[derive(Debug, Clone, Default)]
pub struct ScreenshotWorkers {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ScreenshotWorkers {
    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut handles = self.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.push(thread::spawn(work));
    }

    /// Number of workers still encoding
    pub fn pending(&self) -> usize {
        self.lock().iter().filter(|handle| !handle.is_finished()).count()
    }

    /// Block until every spawned worker has finished
    ///
    /// Returns how many workers were joined. A worker that panicked is logged
    /// and counted.
    pub fn join_all(&self) -> usize {
        let handles = std::mem::take(&mut *self.lock());
        let joined = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                log::error!("Screenshot worker panicked");
            }
        }
        if joined > 0 {
            log::debug!("Joined {joined} screenshot worker(s)");
        }
        joined
    }
}

/// Pooled request to save the next frame to a file
pub struct ScheduledScreenshot {
    state: OperationState,
    grabber: Option<Rc<RefCell<dyn FrameGrabber>>>,
    path: PathBuf,
    with_alpha: bool,
    background: bool,
    buffers: ByteBufferPool,
    workers: ScreenshotWorkers,
}

impl ScheduledScreenshot {
    /// Unconfigured request reading pixels into `buffers`
    ///
    /// Normally obtained from [`SchedOpsPool::allocate_screenshot`].
    ///
    /// # Arguments
    /// * `buffers` - Pool the pixel droplets are taken from and released to
    /// * `workers` - Registry background encoding threads are tracked in
    pub fn new(buffers: ByteBufferPool, workers: ScreenshotWorkers) -> Self {
        Self {
            state: OperationState::one_shot(),
            grabber: None,
            path: PathBuf::new(),
            with_alpha: false,
            background: false,
            buffers,
            workers,
        }
    }

    /// Capture from `grabber` into `path`
    pub fn configure(&mut self, grabber: Rc<RefCell<dyn FrameGrabber>>, path: impl Into<PathBuf>) -> &mut Self {
        self.grabber = Some(grabber);
        self.path = path.into();
        self
    }

    /// Keep the alpha channel instead of forcing opaque pixels
    pub fn set_with_alpha(&mut self, with_alpha: bool) -> &mut Self {
        self.with_alpha = with_alpha;
        self
    }

    /// Encode and write the file on a worker thread
    pub fn set_background(&mut self, background: bool) -> &mut Self {
        self.background = background;
        self
    }

    /// Destination file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the alpha channel is kept
    pub fn with_alpha(&self) -> bool {
        self.with_alpha
    }

    /// Whether encoding runs on a worker thread
    pub fn is_background(&self) -> bool {
        self.background
    }

    /// Byte buffer pool pixels are read into
    pub fn buffers(&self) -> &ByteBufferPool {
        &self.buffers
    }

    fn capture(&self) -> Result<(), OperationError> {
        let grabber = self
            .grabber
            .as_ref()
            .ok_or_else(|| OperationError::InvalidConfiguration("screenshot has no frame grabber".to_string()))?;
        let (width, height) = grabber.borrow().frame_size();
        if width == 0 || height == 0 {
            return Err(OperationError::Capture(format!("empty frame {width}x{height}")));
        }

        let mut droplet = self.buffers.get_droplet(width as usize * height as usize * 4);
        if let Err(err) = grabber.borrow_mut().read_pixels(&mut droplet) {
            self.buffers.release_droplet(droplet);
            return Err(err);
        }
        if !self.with_alpha {
            for pixel in bytemuck::cast_slice_mut::<u8, [u8; 4]>(&mut droplet) {
                pixel[3] = u8::MAX;
            }
        }

        if self.background {
            let path = self.path.clone();
            let buffers = self.buffers.clone();
            self.workers.spawn(move || {
                match save_png(&path, &droplet, width, height) {
                    Ok(()) => log::info!("Screenshot saved to {}", path.display()),
                    Err(err) => log::error!("Failed to save screenshot {}: {}", path.display(), err),
                }
                buffers.release_droplet(droplet);
            });
            Ok(())
        } else {
            let result = save_png(&self.path, &droplet, width, height);
            self.buffers.release_droplet(droplet);
            result?;
            log::info!("Screenshot saved to {}", self.path.display());
            Ok(())
        }
    }
}

fn save_png(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<(), image::ImageError> {
    image::save_buffer_with_format(path, pixels, width, height, image::ColorType::Rgba8, image::ImageFormat::Png)
}

impl ScheduledOperation for ScheduledScreenshot {
    fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        self.state.set_alive(false);
        self.capture()
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    fn set_alive(&mut self, alive: bool) {
        self.state.set_alive(alive);
    }

    fn is_persistent(&self) -> bool {
        false
    }

    fn is_pooled(&self) -> bool {
        true
    }

    fn recycle(self: Box<Self>, pools: &mut SchedOpsPool) {
        pools.deallocate_screenshot(*self);
    }
}

impl Poolable for ScheduledScreenshot {
    fn reset(&mut self) {
        self.state = OperationState::one_shot();
        self.grabber = None;
        self.path = PathBuf::new();
        self.with_alpha = false;
        self.background = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::TimingMode;
    use crate::scheduler::OperationScheduler;

    /// 2x2 frame with half-transparent red pixels
    struct SolidFrame;

    impl FrameGrabber for SolidFrame {
        fn frame_size(&self) -> (u32, u32) {
            (2, 2)
        }

        fn read_pixels(&mut self, pixels: &mut [u8]) -> Result<(), OperationError> {
            for pixel in pixels.chunks_exact_mut(4) {
                pixel.copy_from_slice(&[255, 0, 0, 128]);
            }
            Ok(())
        }
    }

    struct BrokenFrame;

    impl FrameGrabber for BrokenFrame {
        fn frame_size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn read_pixels(&mut self, _pixels: &mut [u8]) -> Result<(), OperationError> {
            Err(OperationError::Capture("device lost".to_string()))
        }
    }

    fn temp_png(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("frame_engine_{}_{}.png", name, std::process::id()))
    }

    #[test]
    fn test_saves_opaque_png_and_returns_to_pool() {
        let path = temp_png("opaque");
        let mut scheduler = OperationScheduler::default();
        let mut screenshot = scheduler.pools_mut().allocate_screenshot();
        screenshot.configure(Rc::new(RefCell::new(SolidFrame)), &path);
        scheduler.schedule_operation(screenshot);

        scheduler.update(0, 0, TimingMode::Milliseconds);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pools().screenshots().available(), 1);
        assert_eq!(scheduler.pools().byte_buffers().size(), 1);
        assert_eq!(scheduler.pools().byte_buffers().outstanding(), 0);

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (2, 2));
        assert_eq!(saved.get_pixel(1, 1).0, [255, 0, 0, 255]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_keeps_alpha_when_requested() {
        let path = temp_png("alpha");
        let mut scheduler = OperationScheduler::default();
        let mut screenshot = scheduler.pools_mut().allocate_screenshot();
        screenshot
            .configure(Rc::new(RefCell::new(SolidFrame)), &path)
            .set_with_alpha(true);
        scheduler.schedule_operation(screenshot);
        scheduler.update(0, 0, TimingMode::Milliseconds);

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.get_pixel(0, 0).0, [255, 0, 0, 128]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_capture_failure_releases_droplet() {
        let mut scheduler = OperationScheduler::default();
        let mut screenshot = scheduler.pools_mut().allocate_screenshot();
        screenshot.configure(Rc::new(RefCell::new(BrokenFrame)), temp_png("broken"));
        scheduler.schedule_operation(screenshot);

        scheduler.update(0, 0, TimingMode::Milliseconds);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pools().byte_buffers().outstanding(), 0);
        assert_eq!(scheduler.pools().screenshots().available(), 1);
    }

    #[test]
    fn test_background_save_is_joined() {
        let path = temp_png("background");
        let mut scheduler = OperationScheduler::default();
        let mut screenshot = scheduler.pools_mut().allocate_screenshot();
        screenshot
            .configure(Rc::new(RefCell::new(SolidFrame)), &path)
            .set_background(true);
        scheduler.schedule_operation(screenshot);
        scheduler.update(0, 0, TimingMode::Milliseconds);

        assert_eq!(scheduler.pools().join_screenshot_workers(), 1);
        assert_eq!(scheduler.pools().screenshot_workers().pending(), 0);
        assert_eq!(scheduler.pools().byte_buffers().outstanding(), 0);
        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.get_pixel(0, 1).0, [255, 0, 0, 255]);
        let _ = std::fs::remove_file(&path);

        assert_eq!(scheduler.pools().join_screenshot_workers(), 0);
    }

    #[test]
    fn test_recycled_request_is_reset() {
        let mut pools = SchedOpsPool::default();
        let mut screenshot = pools.allocate_screenshot();
        screenshot
            .configure(Rc::new(RefCell::new(SolidFrame)), "shot.png")
            .set_with_alpha(true)
            .set_background(true);
        pools.deallocate_screenshot(screenshot);

        let screenshot = pools.allocate_screenshot();
        assert_eq!(screenshot.path(), Path::new(""));
        assert!(!screenshot.with_alpha());
        assert!(!screenshot.is_background());
        assert!(screenshot.is_alive());
    }
}
