use crate::SwitchError;
#[cfg(unix)]
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// An OS termination signal that a [`Switch`](crate::Switch) may observe.
///
/// On Unix platforms every variant maps to the corresponding POSIX signal. On
/// other platforms only [`Interrupt`](ShutdownSignal::Interrupt) (the `ctrl_c`
/// action) is deliverable: the remaining variants are accepted but never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownSignal {
    /// `SIGINT`, or the `ctrl_c` action on non-Unix platforms.
    Interrupt,

    /// `SIGTERM`.
    Terminate,

    /// `SIGHUP`.
    Hangup,

    /// `SIGQUIT`.
    Quit,

    /// `SIGUSR1`.
    User1,

    /// `SIGUSR2`.
    User2,
}

impl ShutdownSignal {
    /// The signals observed by a [`Switch`](crate::Switch) unless specified
    /// otherwise.
    pub const DEFAULT: [ShutdownSignal; 2] = [Self::Interrupt, Self::Terminate];

    /// Returns the conventional name of this signal.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Hangup => "SIGHUP",
            Self::Quit => "SIGQUIT",
            Self::User1 => "SIGUSR1",
            Self::User2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    fn kind(&self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Self::Interrupt => SignalKind::interrupt(),
            Self::Terminate => SignalKind::terminate(),
            Self::Hangup => SignalKind::hangup(),
            Self::Quit => SignalKind::quit(),
            Self::User1 => SignalKind::user_defined1(),
            Self::User2 => SignalKind::user_defined2(),
        }
    }
}

impl Display for ShutdownSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns the registered signal streams of a single switch.
///
/// Dropping the listener stops signal delivery to it. Note that the Tokio
/// signal driver never restores the default OS disposition of a signal once it
/// has been registered: after the first listener is created, the signal no
/// longer terminates the process by default.
#[cfg(unix)]
pub(crate) struct SignalListener {
    streams: Vec<(ShutdownSignal, tokio::signal::unix::Signal)>,
}

#[cfg(unix)]
impl SignalListener {
    /// Registers interest in each of the given signals. Duplicates are
    /// registered once.
    pub(crate) fn register(
        signals: impl IntoIterator<Item = ShutdownSignal>,
    ) -> Result<Self, SwitchError> {
        let unique = signals.into_iter().collect::<BTreeSet<_>>();
        let mut streams = Vec::with_capacity(unique.len());

        for signal in unique {
            let stream = tokio::signal::unix::signal(signal.kind())
                .map_err(|source| SwitchError::Signal { signal, source })?;

            streams.push((signal, stream));
        }

        Ok(Self { streams })
    }

    /// Waits for the first of the registered signals to arrive. Never
    /// completes if no signals are registered.
    pub(crate) async fn recv(&mut self) -> ShutdownSignal {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }

        let waiting = self.streams.iter_mut().map(|(signal, stream)| {
            Box::pin(async move {
                stream.recv().await;
                *signal
            })
        });

        let (signal, _, _) = futures::future::select_all(waiting).await;

        signal
    }
}

/// Owns the `ctrl_c` subscription of a single switch on non-Unix platforms.
#[cfg(not(unix))]
pub(crate) struct SignalListener {
    interrupt: bool,
}

#[cfg(not(unix))]
impl SignalListener {
    /// Records whether [`ShutdownSignal::Interrupt`] is among the given
    /// signals. Other signals are not deliverable on this platform.
    pub(crate) fn register(
        signals: impl IntoIterator<Item = ShutdownSignal>,
    ) -> Result<Self, SwitchError> {
        let interrupt = signals
            .into_iter()
            .any(|signal| signal == ShutdownSignal::Interrupt);

        Ok(Self { interrupt })
    }

    /// Waits for the `ctrl_c` action, if it was requested.
    pub(crate) async fn recv(&mut self) -> ShutdownSignal {
        if self.interrupt && tokio::signal::ctrl_c().await.is_ok() {
            return ShutdownSignal::Interrupt;
        }

        std::future::pending().await
    }
}
