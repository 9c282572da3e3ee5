//! Handing built atlases to the context that owns rendering resources.
//!
//! Texture creation has to happen on one designated thread. The compiler
//! never touches GPU state itself: it sends the atlas through an
//! [`UploadQueue`] and blocks on the returned [`UploadTicket`] until the
//! [`RenderResourceOwner`] on that thread has processed it.

use crate::atlas::TextureAtlas;
use crate::error::{CompileError, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Turns a built atlas into rendering resources. Runs on the owner's
/// thread only.
pub trait AtlasUploader {
    fn upload(&mut self, atlas: &TextureAtlas) -> Result<()>;
}

/// Uploader for hosts without a renderer. Accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessUploader;

impl AtlasUploader for HeadlessUploader {
    fn upload(&mut self, _atlas: &TextureAtlas) -> Result<()> {
        Ok(())
    }
}

struct UploadTask {
    atlas: Arc<TextureAtlas>,
    done: Sender<Result<()>>,
}

/// Sending side of the upload channel.
#[derive(Clone)]
pub struct UploadQueue {
    tasks: Sender<UploadTask>,
}

impl UploadQueue {
    /// Queue an atlas for upload.
    pub fn submit(&self, atlas: Arc<TextureAtlas>) -> Result<UploadTicket> {
        let (done, result) = crossbeam_channel::bounded(1);
        self.tasks
            .send(UploadTask { atlas, done })
            .map_err(|_| CompileError::Upload("render resource owner is gone".to_string()))?;
        Ok(UploadTicket { result })
    }

    /// Queue an atlas and wait for the owner to finish with it.
    pub fn upload(&self, atlas: Arc<TextureAtlas>) -> Result<()> {
        self.submit(atlas)?.wait()
    }
}

/// Completion signal of one queued upload.
pub struct UploadTicket {
    result: Receiver<Result<()>>,
}

impl UploadTicket {
    /// Block until the owner has run the upload, returning its outcome.
    pub fn wait(self) -> Result<()> {
        self.result
            .recv()
            .map_err(|_| CompileError::Upload("upload task was dropped unprocessed".to_string()))?
    }

    /// The outcome, if the owner has already run the upload.
    pub fn try_wait(&self) -> Option<Result<()>> {
        self.result.try_recv().ok()
    }
}

/// Receiving side: lives on the rendering thread and runs uploads there.
pub struct RenderResourceOwner<U: AtlasUploader> {
    uploader: U,
    tasks: Receiver<UploadTask>,
}

impl<U: AtlasUploader> RenderResourceOwner<U> {
    pub fn new(uploader: U) -> (Self, UploadQueue) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (
            Self {
                uploader,
                tasks: rx,
            },
            UploadQueue { tasks: tx },
        )
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    fn run_task(&mut self, task: UploadTask) {
        let outcome = self.uploader.upload(&task.atlas);
        if let Err(e) = &outcome {
            log::warn!("Atlas upload failed: {}", e);
        }
        // The waiting side may have given up; nothing to report then.
        let _ = task.done.send(outcome);
    }

    /// Run every upload queued so far without blocking, e.g. once per
    /// frame. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.tasks.try_recv() {
                Ok(task) => {
                    self.run_task(task);
                    count += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return count,
            }
        }
    }

    /// Serve uploads until every queue has been dropped, then hand the
    /// uploader back.
    pub fn run(mut self) -> U {
        while let Ok(task) = self.tasks.recv() {
            self.run_task(task);
        }
        self.uploader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingUploader {
        uploads: usize,
        fail: bool,
    }

    impl AtlasUploader for CountingUploader {
        fn upload(&mut self, _atlas: &TextureAtlas) -> Result<()> {
            if self.fail {
                return Err(CompileError::Upload("device lost".to_string()));
            }
            self.uploads += 1;
            Ok(())
        }
    }

    #[test]
    fn test_upload_on_owner_thread() {
        let (owner, queue) = RenderResourceOwner::new(CountingUploader::default());
        let handle = std::thread::spawn(move || owner.run());

        let atlas = Arc::new(TextureAtlas::empty());
        queue.upload(atlas.clone()).unwrap();
        queue.clone().upload(atlas).unwrap();
        drop(queue);

        assert_eq!(handle.join().unwrap().uploads, 2);
    }

    #[test]
    fn test_process_pending() {
        let (mut owner, queue) = RenderResourceOwner::new(CountingUploader::default());
        let ticket = queue.submit(Arc::new(TextureAtlas::empty())).unwrap();
        assert!(ticket.try_wait().is_none());

        assert_eq!(owner.process_pending(), 1);
        assert_eq!(owner.process_pending(), 0);
        assert!(ticket.wait().is_ok());
        assert_eq!(owner.uploader().uploads, 1);
    }

    #[test]
    fn test_failures_reach_the_caller() {
        let (mut owner, queue) = RenderResourceOwner::new(CountingUploader {
            fail: true,
            ..Default::default()
        });
        let ticket = queue.submit(Arc::new(TextureAtlas::empty())).unwrap();
        owner.process_pending();
        assert!(matches!(ticket.wait(), Err(CompileError::Upload(_))));
    }

    #[test]
    fn test_dropped_owner() {
        let (owner, queue) = RenderResourceOwner::new(HeadlessUploader);
        drop(owner);
        assert!(matches!(
            queue.upload(Arc::new(TextureAtlas::empty())),
            Err(CompileError::Upload(_))
        ));
    }
}
