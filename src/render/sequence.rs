//! Multi-frame morph rendering.
//!
//! [`FrameSequence`] renders the frames of an animation lazily on the calling
//! thread. [`AnimationWorker`] runs the same loop on a background thread and
//! hands frames back over a channel, so an interactive caller stays responsive
//! while frames are produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use image::RgbImage;
use log::{debug, trace};

use crate::config::FrameCount;
use crate::error::MorphError;
use crate::mesh::CorrespondenceMesh;
use crate::render::morph::MorphRenderer;

/// One rendered frame of a morph animation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in the sequence, starting at 0.
    pub index: u32,
    /// Blend parameter the frame was rendered at, `index / N`.
    pub tau: f64,
    pub image: RgbImage,
}

/// Lazy iterator over the frames `τ = 0, 1/N, ..., (N-1)/N`.
///
/// Each call to `next` renders one frame. The sequence ends early after
/// yielding an error.
pub struct FrameSequence<'a> {
    renderer: &'a MorphRenderer,
    mesh: &'a CorrespondenceMesh,
    source: &'a RgbImage,
    target: &'a RgbImage,
    count: FrameCount,
    next: u32,
}

impl Iterator for FrameSequence<'_> {
    type Item = Result<Frame, MorphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count.get() {
            return None;
        }
        let index = self.next;
        let tau = index as f64 * self.count.tau_step();

        match self
            .renderer
            .render_frame(self.mesh, self.source, self.target, tau)
        {
            Ok(image) => {
                self.next += 1;
                Some(Ok(Frame { index, tau, image }))
            }
            Err(err) => {
                self.next = self.count.get();
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count.get() - self.next) as usize;
        (0, Some(remaining))
    }
}

impl MorphRenderer {
    /// Frames of a `count`-frame animation from `source` to `target`.
    pub fn frames<'a>(
        &'a self,
        mesh: &'a CorrespondenceMesh,
        source: &'a RgbImage,
        target: &'a RgbImage,
        count: FrameCount,
    ) -> FrameSequence<'a> {
        FrameSequence {
            renderer: self,
            mesh,
            source,
            target,
            count,
            next: 0,
        }
    }
}

/// A background frame loop.
///
/// The worker owns its own copy of the mesh and both images, so the caller may
/// keep inserting points into its live mesh while frames render. Dropping the
/// worker cancels it and waits for the thread to exit.
pub struct AnimationWorker {
    cancelled: Arc<AtomicBool>,
    frames: Receiver<Result<Frame, MorphError>>,
    handle: Option<JoinHandle<u32>>,
}

impl AnimationWorker {
    pub fn spawn(
        renderer: MorphRenderer,
        mesh: CorrespondenceMesh,
        source: RgbImage,
        target: RgbImage,
        count: FrameCount,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || {
            run_frames(&renderer, &mesh, &source, &target, count, &flag, &tx)
        });

        Self {
            cancelled,
            frames: rx,
            handle: Some(handle),
        }
    }

    /// Receiving end of the frame channel. It disconnects once the loop ends.
    pub fn frames(&self) -> &Receiver<Result<Frame, MorphError>> {
        &self.frames
    }

    /// Blocks for the next frame; `None` once the loop has finished.
    pub fn recv(&self) -> Option<Result<Frame, MorphError>> {
        self.frames.recv().ok()
    }

    /// Asks the loop to stop before its next frame.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Waits for the loop to finish and returns how many frames it rendered.
    /// Render errors are delivered through [`AnimationWorker::frames`].
    pub fn join(mut self) -> u32 {
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(rendered) => rendered,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => 0,
        }
    }
}

impl Drop for AnimationWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel();
            let _ = handle.join();
        }
    }
}

fn run_frames(
    renderer: &MorphRenderer,
    mesh: &CorrespondenceMesh,
    source: &RgbImage,
    target: &RgbImage,
    count: FrameCount,
    cancelled: &AtomicBool,
    tx: &Sender<Result<Frame, MorphError>>,
) -> u32 {
    debug!("animation worker started: {}", count);
    let mut rendered = 0;

    for frame in renderer.frames(mesh, source, target, count) {
        if cancelled.load(Ordering::Relaxed) {
            debug!("animation cancelled after {} frames", rendered);
            break;
        }
        if let Ok(frame) = &frame {
            trace!("frame {} (tau={:.4}) ready", frame.index, frame.tau);
            rendered += 1;
        }
        if tx.send(frame).is_err() {
            debug!("frame receiver dropped, stopping animation");
            break;
        }
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MorphConfig;
    use crate::math::vec2::Vec2;
    use approx::assert_relative_eq;
    use image::Rgb;

    const SIZE: u32 = 16;

    fn setup() -> (CorrespondenceMesh, RgbImage, RgbImage) {
        let mut mesh = CorrespondenceMesh::new(MorphConfig::with_size(SIZE).unwrap());
        mesh.insert_point(Vec2::new(5.0, 9.0), Vec2::new(SIZE as f64 + 7.0, 8.0));
        let source = RgbImage::from_pixel(SIZE, SIZE, Rgb([0, 0, 0]));
        let target = RgbImage::from_pixel(SIZE, SIZE, Rgb([255, 255, 255]));
        (mesh, source, target)
    }

    #[test]
    fn test_frames_cover_taus() {
        let (mesh, source, target) = setup();
        let renderer = MorphRenderer::default();
        let count = FrameCount::new(4).unwrap();

        let frames: Vec<Frame> = renderer
            .frames(&mesh, &source, &target, count)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(frames.len(), 4);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i as u32);
            assert_relative_eq!(frame.tau, i as f64 / 4.0);
        }
        assert_eq!(frames[0].image, source);
        // tau = 1/2: black and white blend to mid grey.
        assert!(frames[2].image.pixels().all(|p| p.0 == [128, 128, 128]));
    }

    #[test]
    fn test_frames_stop_after_error() {
        let (mesh, source, _) = setup();
        let wrong = RgbImage::new(SIZE * 2, SIZE);
        let renderer = MorphRenderer::default();
        let results: Vec<_> = renderer
            .frames(&mesh, &source, &wrong, FrameCount::default())
            .collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_worker_delivers_all_frames() {
        let (mesh, source, target) = setup();
        let count = FrameCount::new(8).unwrap();
        let worker = AnimationWorker::spawn(
            MorphRenderer::default(),
            mesh.clone(),
            source,
            target,
            count,
        );

        let indices: Vec<u32> = worker
            .frames()
            .iter()
            .map(|frame| frame.unwrap().index)
            .collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(worker.join(), 8);
    }

    #[test]
    fn test_worker_cancel() {
        let (mesh, source, target) = setup();
        let worker = AnimationWorker::spawn(
            MorphRenderer::default(),
            mesh,
            source,
            target,
            FrameCount::new(FrameCount::MAX).unwrap(),
        );
        worker.cancel();
        assert!(worker.is_cancelled());
        let rendered = worker.join();
        assert!(rendered < FrameCount::MAX);
    }

    #[test]
    fn test_worker_reports_size_mismatch() {
        let (mesh, source, _) = setup();
        let worker = AnimationWorker::spawn(
            MorphRenderer::default(),
            mesh,
            source,
            RgbImage::new(3, 3),
            FrameCount::default(),
        );
        assert!(matches!(
            worker.recv(),
            Some(Err(MorphError::ImageSizeMismatch { role: "target", .. }))
        ));
        assert!(worker.recv().is_none());
        assert_eq!(worker.join(), 0);
    }
}
