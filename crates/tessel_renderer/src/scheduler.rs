//! Progressive multi-threaded tile renderer.
//!
//! A fixed set of named worker threads pulls tiles from a shared list by
//! bumping an atomic index. The caller keeps control: it can poll progress,
//! read the framebuffer while workers fill it in, cancel, or wait.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info, warn};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::framebuffer::FrameBuffer;
use crate::hittable::Hittable;
use crate::renderer::ImageBuffer;
use crate::tile::{create_tiles, render_tile, Tile};

/// Lifecycle of a [`TileRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing has been rendered yet
    Idle,
    /// Splitting the image for a new render
    Tiling,
    /// Workers are consuming tiles
    Running,
    /// Every worker has exited
    Finished,
}

/// Work list and counters shared with the workers of one render.
struct RenderJob {
    tiles: Vec<Tile>,
    next_tile: AtomicUsize,
    completed_tiles: AtomicUsize,
    finished_workers: AtomicUsize,
    cancelled: AtomicBool,
}

impl RenderJob {
    fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            next_tile: AtomicUsize::new(0),
            completed_tiles: AtomicUsize::new(0),
            finished_workers: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        }
    }
}

/// Counts a worker as finished when dropped, including during unwinding.
struct FinishGuard<'a>(&'a AtomicUsize);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        // Release publishes this worker's framebuffer writes to `finished()`
        self.0.fetch_add(1, Ordering::Release);
    }
}

/// Renders a scene tile by tile on its own pool of OS threads.
pub struct TileRenderer {
    config: Arc<RenderConfig>,
    framebuffer: Arc<FrameBuffer>,
    job: Option<Arc<RenderJob>>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
    state: RenderState,
    started: Option<Instant>,
}

impl TileRenderer {
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            framebuffer: Arc::new(FrameBuffer::new(0, 0)),
            job: None,
            workers: Vec::new(),
            worker_count: 0,
            state: RenderState::Idle,
            started: None,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration used by the next render.
    pub fn set_config(&mut self, config: RenderConfig) -> RenderResult<()> {
        config.validate()?;
        self.config = Arc::new(config);
        Ok(())
    }

    /// Start rendering `world` through `camera` and return immediately.
    ///
    /// A render still in progress is cancelled and joined first. If one of
    /// its workers panicked, that error is returned and nothing new starts;
    /// calling `render` again then proceeds. The previous frame stays
    /// visible, dimmed by `config.fade`, until the new tiles overwrite it.
    pub fn render(&mut self, world: Arc<dyn Hittable>, camera: Arc<Camera>) -> RenderResult<()> {
        if self.state == RenderState::Running {
            self.cancel();
        }
        self.wait()?;

        let (width, height) = (camera.image_width, camera.image_height);
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyResolution { width, height });
        }

        if self.framebuffer.width() == width && self.framebuffer.height() == height {
            self.framebuffer.fade(self.config.fade);
        } else {
            self.framebuffer = Arc::new(FrameBuffer::new(width, height));
        }

        self.state = RenderState::Tiling;
        let tiles = create_tiles(width, height, self.config.tile_size, self.config.tile_order);
        let tile_count = tiles.len();
        let job = Arc::new(RenderJob::new(tiles));
        let worker_count = self.config.thread_count().min(tile_count);

        info!(
            "Rendering {}x{} with {} threads over {} tiles",
            width, height, worker_count, tile_count
        );

        self.job = Some(Arc::clone(&job));
        self.started = Some(Instant::now());
        self.worker_count = 0;
        self.state = RenderState::Running;

        for worker in 0..worker_count {
            let worker_job = Arc::clone(&job);
            let world = Arc::clone(&world);
            let camera = Arc::clone(&camera);
            let config = Arc::clone(&self.config);
            let framebuffer = Arc::clone(&self.framebuffer);

            let spawned = thread::Builder::new()
                .name(format!("tessel-worker-{}", worker))
                .spawn(move || {
                    consume_tiles(worker, &worker_job, world.as_ref(), &camera, &config, &framebuffer)
                });

            match spawned {
                Ok(handle) => {
                    self.workers.push(handle);
                    self.worker_count += 1;
                }
                Err(err) => {
                    // Let the workers already running wind down
                    job.cancelled.store(true, Ordering::Relaxed);
                    return Err(RenderError::Spawn(err));
                }
            }
        }

        Ok(())
    }

    /// Whether every worker of the current render has exited.
    pub fn finished(&self) -> bool {
        match &self.job {
            Some(job) => job.finished_workers.load(Ordering::Acquire) >= self.worker_count,
            None => false,
        }
    }

    /// Fraction of tiles completed, in `[0, 1]`.
    pub fn percentage_complete(&self) -> f64 {
        match &self.job {
            Some(job) if !job.tiles.is_empty() => {
                let done = job.completed_tiles.load(Ordering::Relaxed);
                done as f64 / job.tiles.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn state(&self) -> RenderState {
        match self.state {
            RenderState::Running if self.finished() => RenderState::Finished,
            state => state,
        }
    }

    /// Ask the workers to stop after their current tile.
    pub fn cancel(&self) {
        if let Some(job) = &self.job {
            if !job.cancelled.swap(true, Ordering::Relaxed) {
                warn!("Render cancelled");
            }
        }
    }

    /// Block until every worker has exited.
    ///
    /// All workers are joined even if some panicked; the first panic is
    /// then reported.
    pub fn wait(&mut self) -> RenderResult<()> {
        let mut first_panic = None;

        for (worker, handle) in self.workers.drain(..).enumerate() {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                warn!("Render worker {} panicked: {}", worker, message);
                first_panic.get_or_insert(RenderError::WorkerPanicked { worker, message });
            }
        }

        if self.state == RenderState::Running {
            self.state = RenderState::Finished;
            if let Some(started) = self.started.take() {
                info!(
                    "Render finished in {:.2?} ({:.0}% of tiles)",
                    started.elapsed(),
                    100.0 * self.percentage_complete()
                );
            }
        }

        match first_panic {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Shared view of the framebuffer workers are writing into.
    pub fn framebuffer(&self) -> Arc<FrameBuffer> {
        Arc::clone(&self.framebuffer)
    }

    /// Copy of the current image, possibly mid-render.
    pub fn snapshot(&self) -> ImageBuffer {
        self.framebuffer.snapshot()
    }

    /// Convert the current image to RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.snapshot().to_rgba()
    }
}

impl Drop for TileRenderer {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.wait();
    }
}

/// Worker loop: claim tiles until the list is exhausted or the render is
/// cancelled.
fn consume_tiles(
    worker: usize,
    job: &RenderJob,
    world: &dyn Hittable,
    camera: &Camera,
    config: &RenderConfig,
    framebuffer: &FrameBuffer,
) {
    let _finished = FinishGuard(&job.finished_workers);
    let mut rendered = 0;

    while !job.cancelled.load(Ordering::Relaxed) {
        let index = job.next_tile.fetch_add(1, Ordering::Relaxed);
        let Some(tile) = job.tiles.get(index) else {
            break;
        };

        let result = render_tile(tile, camera, world, config);
        framebuffer.write_tile(&result);
        job.completed_tiles.fetch_add(1, Ordering::Relaxed);
        rendered += 1;
    }

    debug!("Render worker {} exiting after {} tiles", worker, rendered);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
