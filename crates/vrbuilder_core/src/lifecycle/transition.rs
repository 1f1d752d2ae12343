/// Life cycle requests.
///
/// These are the **caller-invoked** changes. The implicit "stage process finished"
/// changes are modeled via `finish(stage)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Request {
    Activate,
    Deactivate,
    Abort,
}

/// Internal, compact IDs used for error payloads.
impl Request {
    pub const fn id(self) -> u8 {
        match self {
            Request::Activate => 1,
            Request::Deactivate => 2,
            Request::Abort => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Request::Activate => "activate",
            Request::Deactivate => "deactivate",
            Request::Abort => "abort",
        }
    }
}
