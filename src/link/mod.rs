//! The link runtime: a single pipeline stage with a declared lifecycle, typed input, and
//! untyped-from-the-runtime's-perspective output.
//!
//! Values move between links as `Box<dyn Any + Send>` ("[Message]"); a link declares the concrete
//! type it understands by implementing [TypedLink] instead of [Link] directly — the
//! [TypedLinkAdapter] bridges the two, forwarding anything it cannot downcast unchanged to the
//! next stage, exactly as §4.B of the untyped runtime contract requires.

pub mod chain;
pub mod recon;

use {
    crate::config::{ConfigError, ParamSpec, Scope},
    async_trait::async_trait,
    std::any::Any,
    tokio::sync::mpsc::Sender,
    tokio_util::sync::CancellationToken,
};

/// Errors a link can raise at any lifecycle stage.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{link}: {message}")]
    Process { link: &'static str, message: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl LinkError {
    pub fn process<S: Into<String>>(link: &'static str, message: S) -> Self {
        Self::Process { link, message: message.into() }
    }
}

/// A value moving through the chain. Any `Send + 'static` type can be boxed into a [Message].
pub type Message = Box<dyn Any + Send>;

/// The output side of a link: a typed convenience wrapper over the raw channel sender, carrying
/// the chain's cancellation token so links that fan out internally (e.g. [recon::ReconLink])
/// can select against it cooperatively.
#[derive(Clone)]
pub struct LinkSender {
    inner: Sender<Message>,
    cancellation: CancellationToken,
}

impl LinkSender {
    pub fn new(inner: Sender<Message>, cancellation: CancellationToken) -> Self {
        Self { inner, cancellation }
    }

    /// Emits a value downstream. The value may be of any type; downstream links claim what they
    /// understand and pass the rest through unchanged.
    pub async fn send<T: Send + 'static>(&self, value: T) -> Result<(), LinkError> {
        self.inner.send(Box::new(value)).await.map_err(|_| LinkError::Cancelled)
    }

    async fn send_message(&self, message: Message) -> Result<(), LinkError> {
        self.inner.send(message).await.map_err(|_| LinkError::Cancelled)
    }

    /// The chain-scoped cancellation token. Every suspending operation a link performs should be
    /// raced against this via `tokio::select!` so cancellation is cooperative, per §5.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// The untyped runtime contract every link implements. Most links should implement [TypedLink]
/// instead and get this for free via [TypedLinkAdapter].
#[async_trait]
pub trait Link: Send {
    /// A short, stable name used in log lines and error messages.
    fn name(&self) -> &'static str;

    /// Declares the parameters this link reads out of its [Scope].
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// Validates parameters and acquires resources. Called exactly once before any `process`.
    async fn initialize(&mut self, scope: &Scope) -> Result<(), LinkError>;

    /// Handles one inbound value.
    async fn process(&mut self, input: Message, out: &LinkSender) -> Result<(), LinkError>;

    /// Called once after the inbound channel has been fully drained.
    async fn complete(&mut self, _out: &LinkSender) -> Result<(), LinkError> {
        Ok(())
    }

    /// Releases resources. Called exactly once, after `complete`, on every exit path.
    async fn close(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// A link that only understands one concrete input type `In`. Anything else it receives is
/// forwarded downstream unchanged, matching the untyped-routing contract in §4.B.
#[async_trait]
pub trait TypedLink: Send {
    type Input: Send + 'static;

    fn name(&self) -> &'static str;

    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn initialize(&mut self, scope: &Scope) -> Result<(), LinkError>;

    async fn process_typed(&mut self, input: Self::Input, out: &LinkSender) -> Result<(), LinkError>;

    async fn complete(&mut self, _out: &LinkSender) -> Result<(), LinkError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// Bridges a [TypedLink] into the untyped [Link] contract the chain runtime drives.
pub struct TypedLinkAdapter<L: TypedLink>(pub L);

#[async_trait]
impl<L: TypedLink + Send> Link for TypedLinkAdapter<L> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn params(&self) -> Vec<ParamSpec> {
        self.0.params()
    }

    async fn initialize(&mut self, scope: &Scope) -> Result<(), LinkError> {
        self.0.initialize(scope).await
    }

    async fn process(&mut self, input: Message, out: &LinkSender) -> Result<(), LinkError> {
        match input.downcast::<L::Input>() {
            Ok(typed) => self.0.process_typed(*typed, out).await,
            Err(untyped) => out.send_message(untyped).await,
        }
    }

    async fn complete(&mut self, out: &LinkSender) -> Result<(), LinkError> {
        self.0.complete(out).await
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.0.close().await
    }
}
