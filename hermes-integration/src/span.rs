/// A span of the host application's tracing instrumentation.
///
/// Only root spans, which correspond to transactions, start and finish profiles.
pub trait Span {
    /// Returns the identifier of the span.
    fn span_id(&self) -> &str;

    /// Returns `true` if the span has no parent span.
    fn is_root(&self) -> bool;

    /// Returns `true` if the span was sampled and will be sent.
    fn is_sampled(&self) -> bool;

    /// Sets a string attribute on the span.
    ///
    /// Attributes end up in the data of the trace context of the transaction.
    fn set_attribute(&self, key: &str, value: String);
}
