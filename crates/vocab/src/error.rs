use thiserror::Error;

/// Errors surfaced by vocabulary providers and the service layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VocabError {
    /// The backing data could not be loaded; the provider is unusable until
    /// a retry of `initialize` succeeds.
    #[error("vocabulary data load failed: {0}")]
    Load(String),
    /// A tier was loaded but its payload does not match the provider's
    /// expected schema.
    #[error("tier `{tier}` has an unexpected schema: {reason}")]
    Schema { tier: String, reason: String },
    /// A match or metadata method was called before `initialize` completed.
    #[error("provider `{0}` is not initialized")]
    NotInitialized(String),
    /// `set_active_provider` named a provider that was never registered.
    #[error("unknown vocabulary provider: {0}")]
    UnknownProvider(String),
    /// A match method was called on the service with no active provider.
    #[error("no active vocabulary provider")]
    NoActiveProvider,
    /// `load_tier` was called on a provider without tiered data.
    #[error("provider `{0}` does not support tier loading")]
    TierUnsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = VocabError::NotInitialized("tagged".into());
        assert!(err.to_string().contains("tagged"));

        let err = VocabError::Schema {
            tier: "core".into(),
            reason: "expected tagged entries".into(),
        };
        assert!(err.to_string().contains("core"));
        assert!(err.to_string().contains("expected tagged entries"));
    }
}
