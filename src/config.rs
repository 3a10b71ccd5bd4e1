/// Config for a registered producer
/// ## Fields
/// - `stream_policy`:
///   What to do with a multi-value stream once the injected call finished with its first value.
///
///   This only affects producers registered with [`crate::Options::stream`].
///   Other producers ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub stream_policy: StreamPolicy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamPolicy {
    /// Poll the stream until it ends, discarding the remaining values,
    /// so the code after the first yield point gets to run
    #[default]
    Drain,
    /// Drop the stream right after the call
    Abandon,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn new(stream_policy: StreamPolicy) -> Self {
        Self { stream_policy }
    }
}
