//! The chain composer: assembles links into a linear pipeline connected by typed channels and
//! drives the two-phase shutdown (`Complete` on every link, then `Close` on every link in
//! declaration order) that §4.C and the chain-lifecycle-ordering property (§8.7) require.

use {
    super::{Link, LinkError, LinkSender, Message},
    crate::config::Scope,
    tokio::{
        sync::mpsc::{self, Receiver, Sender},
        task::JoinHandle,
    },
    tokio_util::sync::CancellationToken,
};

/// The default bound on each inter-link channel.
pub const DEFAULT_CAPACITY: usize = 64;

/// A running chain: send values in, receive values of a claimed type out, close to drain.
pub struct ChainHandle {
    head: Option<Sender<Message>>,
    tail: Receiver<Message>,
    join: JoinHandle<Vec<LinkError>>,
    cancellation: CancellationToken,
}

impl ChainHandle {
    /// Delivers a value to the first link in the chain.
    pub async fn send<T: Send + 'static>(&self, value: T) -> Result<(), LinkError> {
        match &self.head {
            Some(head) => head.send(Box::new(value)).await.map_err(|_| LinkError::Cancelled),
            None => Err(LinkError::Cancelled),
        }
    }

    /// Closes the head channel, cascading `Complete`/`Close` through every link.
    pub fn close(&mut self) {
        self.head.take();
    }

    /// Cancels the chain: every suspending call that selects against the cancellation token
    /// returns promptly, per the cancellation-liveness property (§8.8).
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Drains values of type `T` from the last link's output, skipping anything else.
    pub async fn recv_as<T: 'static>(&mut self) -> Option<T> {
        loop {
            let message = self.tail.recv().await?;
            match message.downcast::<T>() {
                Ok(value) => return Some(*value),
                Err(_) => continue,
            }
        }
    }

    /// Waits for every link's `Close` to finish and returns the errors collected along the way.
    pub async fn join(mut self) -> Vec<LinkError> {
        self.close();
        self.join.await.unwrap_or_else(|_| vec![LinkError::Cancelled])
    }
}

/// A linear composition of links. Construction is declarative: `Chain::new(vec![l1, l2, l3])`
/// pairs `li`'s output channel with `li+1`'s input channel.
pub struct Chain {
    links: Vec<Box<dyn Link>>,
}

impl Chain {
    pub fn new(links: Vec<Box<dyn Link>>) -> Self {
        Self { links }
    }

    /// Initializes every link (in declaration order) and starts the pipeline, returning a handle
    /// the caller drives with `send`/`recv_as`/`close`.
    pub async fn start(mut self, scope: Scope) -> Result<ChainHandle, LinkError> {
        self.start_with_capacity(scope, DEFAULT_CAPACITY).await
    }

    pub async fn start_with_capacity(mut self, scope: Scope, capacity: usize) -> Result<ChainHandle, LinkError> {
        for link in &mut self.links {
            log::debug!("initializing link {}", link.name());
            link.initialize(&scope).await?;
        }

        let n = self.links.len();
        let cancellation = CancellationToken::new();

        let mut senders: Vec<Sender<Message>> = Vec::with_capacity(n + 1);
        let mut receivers: Vec<Receiver<Message>> = Vec::with_capacity(n + 1);
        for _ in 0..=n {
            let (tx, rx) = mpsc::channel(capacity);
            senders.push(tx);
            receivers.push(rx);
        }

        let head = senders[0].clone();
        let mut receivers_iter = receivers.into_iter();
        let head_rx = receivers_iter.next().expect("at least one receiver");
        let mut inbound_slots: Vec<Receiver<Message>> = vec![head_rx];
        inbound_slots.extend(receivers_iter);
        let tail_rx = inbound_slots.pop().expect("tail receiver present");

        let mut join_handles = Vec::with_capacity(n);
        let mut links_iter = self.links.into_iter();
        let mut inbound_iter = inbound_slots.into_iter();

        for i in 0..n {
            let mut link = links_iter.next().expect("link count matches channel count");
            let mut inbound = inbound_iter.next().expect("inbound receiver for every link");
            let out = LinkSender::new(senders[i + 1].clone(), cancellation.clone());
            let name = link.name();

            let handle: JoinHandle<(Box<dyn Link>, Option<LinkError>)> = tokio::spawn(async move {
                let mut err = None;
                while let Some(message) = inbound.recv().await {
                    if let Err(e) = link.process(message, &out).await {
                        log::warn!("link {name} process failed: {e}");
                        err = Some(e);
                        break;
                    }
                }

                if err.is_none() {
                    if let Err(e) = link.complete(&out).await {
                        log::warn!("link {name} complete failed: {e}");
                        err = Some(e);
                    }
                }

                drop(out);
                (link, err)
            });
            join_handles.push(handle);
        }

        drop(senders);

        let driver = tokio::spawn(async move {
            let mut completed = Vec::with_capacity(n);
            let mut errors = Vec::new();

            for handle in join_handles {
                match handle.await {
                    Ok((link, err)) => {
                        if let Some(e) = err {
                            errors.push(e);
                        }
                        completed.push(link);
                    }
                    Err(_join_err) => errors.push(LinkError::Cancelled),
                }
            }

            for mut link in completed {
                if let Err(e) = link.close().await {
                    errors.push(e);
                }
            }

            errors
        });

        Ok(ChainHandle { head: Some(head), tail: tail_rx, join: driver, cancellation })
    }
}
