use uuid::Uuid;

use crate::models::bookingmodel::{Booking, BookingStatus};

/// How a caller relates to a booking. Every handler that reads or mutates a
/// booking derives this once instead of re-implementing ownership checks
/// inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingRole {
    Customer,
    ProviderOwner,
}

pub fn booking_role(
    booking: &Booking,
    provider_profile_id: Uuid,
    caller_id: Uuid,
) -> Option<BookingRole> {
    if booking.customer_id == caller_id {
        Some(BookingRole::Customer)
    } else if provider_profile_id == caller_id {
        Some(BookingRole::ProviderOwner)
    } else {
        None
    }
}

/// Status transitions each side may perform. Terminal states are frozen for
/// everyone; customers can only back out before the work starts, the
/// provider's owner drives the rest of the lifecycle.
pub fn can_transition(role: BookingRole, from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;

    if from.is_terminal() || from == to {
        return false;
    }

    match role {
        BookingRole::Customer => matches!((from, to), (Pending, Cancelled) | (Confirmed, Cancelled)),
        BookingRole::ProviderOwner => matches!(
            (from, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::PaymentStatus;
    use chrono::Utc;

    fn booking(customer_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_id,
            provider_id: Uuid::new_v4(),
            service_category_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            duration_hours: 2,
            total_price_cents: 15000,
            address: "addr".to_string(),
            address_details: None,
            notes: None,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            payment_method: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn roles_are_derived_from_ownership() {
        let customer = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let b = booking(customer);

        assert_eq!(booking_role(&b, owner, customer), Some(BookingRole::Customer));
        assert_eq!(booking_role(&b, owner, owner), Some(BookingRole::ProviderOwner));
        assert_eq!(booking_role(&b, owner, stranger), None);
    }

    #[test]
    fn customer_can_only_cancel_before_work_starts() {
        use BookingStatus::*;
        assert!(can_transition(BookingRole::Customer, Pending, Cancelled));
        assert!(can_transition(BookingRole::Customer, Confirmed, Cancelled));
        assert!(!can_transition(BookingRole::Customer, InProgress, Cancelled));
        assert!(!can_transition(BookingRole::Customer, Pending, Confirmed));
        assert!(!can_transition(BookingRole::Customer, Pending, Completed));
    }

    #[test]
    fn provider_owner_drives_the_lifecycle() {
        use BookingStatus::*;
        assert!(can_transition(BookingRole::ProviderOwner, Pending, Confirmed));
        assert!(can_transition(BookingRole::ProviderOwner, Confirmed, InProgress));
        assert!(can_transition(BookingRole::ProviderOwner, InProgress, Completed));
        assert!(can_transition(BookingRole::ProviderOwner, Confirmed, Cancelled));
        assert!(!can_transition(BookingRole::ProviderOwner, Pending, Completed));
        assert!(!can_transition(BookingRole::ProviderOwner, InProgress, Cancelled));
    }

    #[test]
    fn terminal_states_are_frozen() {
        use BookingStatus::*;
        for role in [BookingRole::Customer, BookingRole::ProviderOwner] {
            assert!(!can_transition(role, Completed, Cancelled));
            assert!(!can_transition(role, Cancelled, Pending));
            assert!(!can_transition(role, Cancelled, Confirmed));
        }
    }

    #[test]
    fn no_op_transitions_are_rejected() {
        use BookingStatus::*;
        assert!(!can_transition(BookingRole::ProviderOwner, Pending, Pending));
    }
}
