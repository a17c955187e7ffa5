use std::sync::Arc;

use ite_config::Config;
use ite_io::{ClipboardSink, ClipboardSource, SurfaceCapturer};
use ite_ocr::TextExtractor;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::PipelineContext;
use crate::events::event_loop;
use crate::panel::Panel;
use crate::registry::SurfaceRegistry;
use crate::runtime::RuntimeRequest;
use crate::surface::SurfaceHost;

/// Centralized channel management
pub struct ChannelSet {
    /// Pages and the panel to the orchestrator
    pub runtime: (AsyncSender<RuntimeRequest>, AsyncReceiver<RuntimeRequest>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            runtime: kanal::bounded_async(capacity),
        }
    }
}

/// The environment the app runs against
pub struct Collaborators {
    pub capturer: Arc<dyn SurfaceCapturer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub clipboard_source: Arc<dyn ClipboardSource>,
    pub clipboard_sink: Arc<dyn ClipboardSink>,
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    ctx: PipelineContext,
    host: SurfaceHost,
    clipboard_source: Arc<dyn ClipboardSource>,
    clipboard_sink: Arc<dyn ClipboardSink>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let config = Arc::new(config);
        let channels = ChannelSet::new(config.channel_capacity);
        let registry = Arc::new(SurfaceRegistry::new());

        let ctx = PipelineContext::new(
            collaborators.capturer,
            collaborators.extractor,
            registry.clone(),
            config.pipeline.clone(),
        );
        let host = SurfaceHost::new(
            registry,
            channels.runtime.0.clone(),
            config,
            collaborators.clipboard_sink.clone(),
        );

        Self {
            channels,
            ctx,
            host,
            clipboard_source: collaborators.clipboard_source,
            clipboard_sink: collaborators.clipboard_sink,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Orchestrator
        tasks.spawn(event_loop(
            self.ctx.clone(),
            self.channels.runtime.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn host(&self) -> &SurfaceHost {
        &self.host
    }

    pub fn registry(&self) -> &Arc<SurfaceRegistry> {
        self.host.registry()
    }

    pub fn panel(&self) -> Panel {
        Panel::new(
            self.host.clone(),
            self.channels.runtime.0.clone(),
            self.clipboard_source.clone(),
            self.clipboard_sink.clone(),
        )
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
