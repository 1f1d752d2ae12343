use vrbuilder_core::error::{CoreError, Domain, Severity};

/// Emit `err` at the tracing level matching its severity.
pub fn log_core_error(err: &CoreError) {
    let domain = domain_label(err.domain);
    match err.severity {
        Severity::Trace => tracing::trace!(domain, "{err}"),
        Severity::Debug => tracing::debug!(domain, "{err}"),
        Severity::Info => tracing::info!(domain, "{err}"),
        Severity::Warn => tracing::warn!(domain, "{err}"),
        Severity::Error | Severity::Fatal => tracing::error!(domain, "{err}"),
    }
}

fn domain_label(domain: Domain) -> &'static str {
    match domain {
        Domain::Lifecycle => "lifecycle",
        Domain::Process => "process",
        Domain::Scene => "scene",
        Domain::Registry => "registry",
        Domain::Serialization => "serialization",
        Domain::Other => "other",
    }
}
