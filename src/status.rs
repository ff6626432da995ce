//! Outcome of anonymizing one object

use std::fmt;

/// What the caller should do with an object after a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The object was anonymized
    Ok,
    /// The object passes through unchanged, with the reason
    Skip(String),
    /// The object must be diverted unmodified, with the failure message
    Quarantine(String),
}

impl Status {
    /// Whether the object was anonymized
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Whether the object was skipped
    pub fn is_skip(&self) -> bool {
        matches!(self, Status::Skip(_))
    }

    /// Whether the object must be quarantined
    pub fn is_quarantine(&self) -> bool {
        matches!(self, Status::Quarantine(_))
    }

    /// Status name as written in logs
    pub fn name(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Skip(_) => "SKIP",
            Status::Quarantine(_) => "QUARANTINE",
        }
    }

    /// Reason or failure message; empty for OK
    pub fn message(&self) -> &str {
        match self {
            Status::Ok => "",
            Status::Skip(message) | Status::Quarantine(message) => message,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.name(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Status::Ok.to_string(), "(OK,)");
        assert_eq!(
            Status::Quarantine("Insufficient arguments for $hashuid".into()).to_string(),
            "(QUARANTINE,Insufficient arguments for $hashuid)"
        );
        assert!(Status::Skip("not a report".into()).is_skip());
    }
}
