use std::path::PathBuf;

use futures::channel::oneshot;
use image::RgbaImage;

use crate::error::{EngineError, EngineResult};

/// Where image bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    fn read(self) -> EngineResult<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            #[cfg(not(target_arch = "wasm32"))]
            Self::Path(path) => Ok(std::fs::read(path)?),
            #[cfg(target_arch = "wasm32")]
            Self::Path(path) => Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("cannot read {} in the browser", path.display()),
            ))),
        }
    }
}

/// Decodes any format the `image` crate understands into straight RGBA
pub fn decode(source: ImageSource) -> EngineResult<RgbaImage> {
    let bytes = source.read()?;
    let image = image::load_from_memory(&bytes)?;
    log::debug!("Decoded image: {}x{}", image.width(), image.height());
    Ok(image.to_rgba8())
}

/// A decode running off the UI thread
#[derive(Debug)]
pub struct PendingLoad {
    name: String,
    receiver: oneshot::Receiver<EngineResult<RgbaImage>>,
}

impl PendingLoad {
    /// Starts decoding `source`; `name` is only used for messages
    pub fn spawn(source: ImageSource, name: impl Into<String>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let name = name.into();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let thread_name = format!("decode {name}");
            let spawned = std::thread::Builder::new().name(thread_name).spawn(move || {
                // The receiver may be gone if the engine dropped the load
                let _ = sender.send(decode(source));
            });
            if let Err(err) = spawned {
                log::error!("Failed to start image decode thread: {err}");
            }
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let _ = sender.send(decode(source));
        });

        Self { name, receiver }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The decode result once it is ready; `None` while still running
    pub fn try_take(&mut self) -> Option<EngineResult<RgbaImage>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(EngineError::LoadCancelled)),
        }
    }

    /// Waits for the decode to finish
    pub async fn wait(self) -> (String, EngineResult<RgbaImage>) {
        let result = match self.receiver.await {
            Ok(result) => result,
            Err(oneshot::Canceled) => Err(EngineError::LoadCancelled),
        };
        (self.name, result)
    }
}
