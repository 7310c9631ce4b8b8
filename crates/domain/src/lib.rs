//! Domain layer for the hotel booking system.
//!
//! This crate provides the data model shared by the booking engine and its
//! collaborators:
//! - Booking requests, persisted bookings and waiting-list entries
//! - Value objects (`Money`, `Stay`, `RoomType`)
//! - The pure eligibility and availability policy used when creating a booking

pub mod booking;
pub mod error;
pub mod policy;
pub mod room;
pub mod user;
pub mod value_objects;
pub mod waitlist;

pub use booking::{
    Booking, BookingChangeRequest, BookingChanges, BookingRequest, BookingStatus, NewBooking,
};
pub use error::DomainError;
pub use policy::{
    MINIMUM_BOOKING_AGE, RoomSelectionPolicy, effective_last_check_out, is_available_for,
    is_eligible,
};
pub use room::RoomInfo;
pub use user::UserProfile;
pub use value_objects::{Money, RoomType, Stay};
pub use waitlist::{
    NewWaitlistEntry, WaitingListEntry, WaitlistChangeRequest, WaitlistChanges, WaitlistRequest,
    WaitlistStatus,
};
