use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult};

/// Sale order status lifecycle.
///
/// ```text
/// Pending(1) -> Accepted(2) -> Exported(3) -> Completed(4)
///     |             |
///     +-------------+--> Cancelled(5)
/// ```
///
/// The numeric ids are what `sale_order.sale_order_status_id` stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleOrderStatus {
    Pending,
    Accepted,
    Exported,
    Completed,
    Cancelled,
}

impl SaleOrderStatus {
    pub const ALL: [SaleOrderStatus; 5] = [
        SaleOrderStatus::Pending,
        SaleOrderStatus::Accepted,
        SaleOrderStatus::Exported,
        SaleOrderStatus::Completed,
        SaleOrderStatus::Cancelled,
    ];

    pub fn id(self) -> i16 {
        match self {
            SaleOrderStatus::Pending => 1,
            SaleOrderStatus::Accepted => 2,
            SaleOrderStatus::Exported => 3,
            SaleOrderStatus::Completed => 4,
            SaleOrderStatus::Cancelled => 5,
        }
    }

    pub fn from_id(id: i16) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| DomainError::invariant(format!("unknown sale order status id {id}")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleOrderStatus::Pending => "pending",
            SaleOrderStatus::Accepted => "accepted",
            SaleOrderStatus::Exported => "exported",
            SaleOrderStatus::Completed => "completed",
            SaleOrderStatus::Cancelled => "cancelled",
        }
    }

    /// The transition table.
    pub fn can_transition_to(self, next: SaleOrderStatus) -> bool {
        use SaleOrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Cancelled)
                | (Accepted, Exported)
                | (Accepted, Cancelled)
                | (Exported, Completed)
        )
    }

    pub fn transition_to(self, next: SaleOrderStatus) -> DomainResult<SaleOrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_transition(self, next))
        }
    }

    /// Orders whose lines may still be exported.
    pub fn is_exportable(self) -> bool {
        self == SaleOrderStatus::Accepted
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SaleOrderStatus::Completed | SaleOrderStatus::Cancelled)
    }
}

impl core::fmt::Display for SaleOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SaleOrderStatus::*;

    #[test]
    fn ids_round_trip_through_storage_representation() {
        for status in SaleOrderStatus::ALL {
            assert_eq!(SaleOrderStatus::from_id(status.id()).unwrap(), status);
        }
        assert!(SaleOrderStatus::from_id(0).is_err());
        assert!(SaleOrderStatus::from_id(6).is_err());
    }

    #[test]
    fn happy_path_is_allowed() {
        assert_eq!(Pending.transition_to(Accepted).unwrap(), Accepted);
        assert_eq!(Accepted.transition_to(Exported).unwrap(), Exported);
        assert_eq!(Exported.transition_to(Completed).unwrap(), Completed);
    }

    #[test]
    fn cancel_only_before_export() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(!Exported.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn skipping_states_is_rejected() {
        let err = Pending.transition_to(Completed).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: "pending".to_string(),
                to: "completed".to_string(),
            }
        );
        assert!(Pending.transition_to(Exported).is_err());
        assert!(Accepted.transition_to(Completed).is_err());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in SaleOrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} should be rejected");
            }
        }
    }

    #[test]
    fn no_self_transitions() {
        for status in SaleOrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Accepted).unwrap(), "\"accepted\"");
    }
}
