//! Vendor domain module.
//!
//! Business rules for the suppliers parts are bought from, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod vendor;

pub use vendor::{
    ContactInfo, RegisterVendor, RemoveVendor, UpdateVendor, Vendor, VendorCommand, VendorEvent,
    VendorId, VendorPatch, VendorRegistered, VendorRemoved, VendorUpdated, is_valid_email,
};
