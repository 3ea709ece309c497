use std::fmt::{Display, Formatter};

/// Result of a best-effort push. None of these fail a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    NotOnline,
    DeliveryFailed,
}

impl PushOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PushOutcome::Delivered => "delivered",
            PushOutcome::NotOnline => "not_online",
            PushOutcome::DeliveryFailed => "delivery_failed",
        }
    }
}

impl Display for PushOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
