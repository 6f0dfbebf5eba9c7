use crate::AssetError;
use crate::import::{Model, load_gltf};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Loads a glTF model on a background thread.
///
/// Poll once per frame; the result is delivered exactly once.
pub struct ModelLoader {
    path: PathBuf,
    rx: Receiver<Result<Model, AssetError>>,
    finished: bool,
}

impl ModelLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let result = load_gltf(&thread_path);
                // The receiver may be gone if the app exited mid-load.
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            tracing::error!("failed to spawn model loader: {e}");
        } else {
            tracing::info!(path = %path.display(), "loading model");
        }
        Self {
            path,
            rx,
            finished: false,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `Some` once, when loading completes or fails; `None` before and after.
    pub fn poll(&mut self) -> Option<Result<Model, AssetError>> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(AssetError::LoaderGone))
            }
        }
    }

    /// Block until the result arrives. Used by headless tools.
    pub fn wait(self) -> Result<Model, AssetError> {
        if self.finished {
            return Err(AssetError::LoaderGone);
        }
        self.rx.recv().map_err(|_| AssetError::LoaderGone)?
    }
}
