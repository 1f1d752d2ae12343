use std::borrow::Cow;
use thiserror::Error;

/// Convenient result alias for vrbuilder_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps onto tracing levels in the runtime crate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Process,
    Scene,
    Registry,
    Serialization,
    Other,
}

/// Stable error "kind" for matching/branching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    /// A life cycle request was made from a stage that does not permit it.
    InvalidState,
    UnknownType,
    Serialization,
    Io,
    Other,
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Life cycle request rejected by the stage guard table.
    StageRequest { from_stage: u8, via_request: u8 },
}

/// The one error type that crosses module boundaries in vrbuilder_core.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    pub fn new(
        domain: Domain,
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            domain,
            kind,
            severity,
            message: message.into(),
            payload: Payload::None,
        }
    }

    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }

    /// Life cycle request made from a stage that does not allow it.
    pub fn invalid_stage_request(from_stage: u8, via_request: u8) -> Self {
        CoreError::error()
            .domain(Domain::Lifecycle)
            .kind(ErrorKind::InvalidState)
            .msg("life cycle request not allowed in current stage")
            .payload(Payload::StageRequest {
                from_stage,
                via_request,
            })
            .build()
    }

    /// Registry lookup for a type name nobody registered.
    pub fn unknown_type(type_name: impl Into<Cow<'static, str>>) -> Self {
        CoreError::error()
            .domain(Domain::Registry)
            .kind(ErrorKind::UnknownType)
            .msg("no factory registered for entity type")
            .payload(Payload::Context {
                key: "type",
                value: type_name.into(),
            })
            .build()
    }

    pub fn is_invalid_state(&self) -> bool {
        self.kind == ErrorKind::InvalidState
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        let kind = if e.is_io() {
            ErrorKind::Io
        } else {
            ErrorKind::Serialization
        };
        CoreError::error()
            .domain(Domain::Serialization)
            .kind(kind)
            .msg("process document could not be (de)serialized")
            .payload(Payload::Context {
                key: "serde_json",
                value: e.to_string().into(),
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_stage_request_is_invalid_state() {
        let e = CoreError::invalid_stage_request(0, 2);
        assert!(e.is_invalid_state());
        assert_eq!(e.domain, Domain::Lifecycle);
        assert_eq!(
            e.payload,
            Payload::StageRequest {
                from_stage: 0,
                via_request: 2
            }
        );
    }

    #[test]
    fn serde_errors_map_to_serialization_kind() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let e: CoreError = err.into();
        assert_eq!(e.kind, ErrorKind::Serialization);
        assert_eq!(e.domain, Domain::Serialization);
    }
}
