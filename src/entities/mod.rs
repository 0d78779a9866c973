pub mod addon;
pub mod booking;
pub mod booking_addon;
pub mod booking_item;
pub mod contact;
pub mod contact_action;
pub mod program;
pub mod program_image;
pub mod program_rate;
pub mod user;
