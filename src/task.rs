use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use crate::{BlurConfig, BlurError, BlurPipeline, HardwareBlurProvider, PixelBuffer};

/// Shared provider handle usable from a worker thread.
pub type SharedProvider = Arc<dyn HardwareBlurProvider + Send + Sync>;

/// A blur dispatched off the calling thread.
///
/// The work runs on the rayon global pool (a plain thread without the
/// `rayon` feature). A started blur cannot be interrupted; callers that no
/// longer want the result simply drop it.
pub struct BlurTask {
    source: PixelBuffer,
    config: BlurConfig,
    provider: Option<SharedProvider>,
}

impl BlurTask {
    #[must_use]
    pub fn new(source: PixelBuffer, config: BlurConfig) -> Self {
        BlurTask {
            source,
            config,
            provider: None,
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Run the pipeline in the background and hand the result to `callback`
    /// on the worker thread.
    pub fn execute<F>(self, callback: F)
    where
        F: FnOnce(Result<PixelBuffer, BlurError>) + Send + 'static,
    {
        let job = move || callback(self.run());

        #[cfg(feature = "rayon")]
        rayon::spawn(job);

        #[cfg(not(feature = "rayon"))]
        drop(std::thread::spawn(job));
    }

    /// Like [`execute`][Self::execute] but delivers the result through a
    /// channel.
    #[must_use]
    pub fn execute_to_channel(self) -> Receiver<Result<PixelBuffer, BlurError>> {
        let (tx, rx) = mpsc::channel();
        self.execute(move |result| {
            // receiver gone means the caller discarded the result
            let _ = tx.send(result);
        });
        rx
    }

    fn run(self) -> Result<PixelBuffer, BlurError> {
        let pipeline = BlurPipeline::new(self.config);
        match self.provider {
            Some(ref provider) => pipeline.with_provider(&**provider).run(&self.source),
            None => pipeline.run(&self.source),
        }
    }
}
