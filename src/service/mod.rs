pub mod access;
pub mod booking_rules;
pub mod payment_gateway;
pub mod webhook;
