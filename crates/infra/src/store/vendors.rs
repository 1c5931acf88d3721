use chrono::Utc;

use stockroom_core::DomainError;
use stockroom_events::EventBus;
use stockroom_vendors::{
    ContactInfo, RegisterVendor, RemoveVendor, UpdateVendor, Vendor, VendorCommand, VendorId,
    VendorPatch,
};

use super::{InventoryStore, VENDOR, decide, missing};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        Ok(self.read()?.vendors.list().into_iter().cloned().collect())
    }

    pub fn vendor(&self, id: VendorId) -> StoreResult<Vendor> {
        self.read()?.vendors.get(&id).cloned().ok_or_else(missing)
    }

    pub fn register_vendor(&self, name: String, contact: ContactInfo) -> StoreResult<Vendor> {
        let vendor_id = VendorId::generate();
        let command = VendorCommand::RegisterVendor(RegisterVendor {
            vendor_id,
            name,
            contact,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let (vendor, events) = decide(&Vendor::empty(vendor_id), &command)?;
            let entries = state.journal_events(vendor_id.0, VENDOR, &events)?;
            state.vendors.upsert(vendor_id, vendor.clone());
            tracing::info!("registered vendor {} ({vendor_id})", vendor.name());
            Ok((vendor, entries))
        })
    }

    pub fn update_vendor(&self, vendor_id: VendorId, patch: VendorPatch) -> StoreResult<Vendor> {
        let command = VendorCommand::UpdateVendor(UpdateVendor {
            vendor_id,
            patch,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.vendors.get(&vendor_id).ok_or_else(missing)?;
            let (vendor, events) = decide(current, &command)?;
            let entries = state.journal_events(vendor_id.0, VENDOR, &events)?;
            state.vendors.upsert(vendor_id, vendor.clone());
            Ok((vendor, entries))
        })
    }

    /// Remove a vendor. Refused while any part is still supplied by it.
    pub fn delete_vendor(&self, vendor_id: VendorId) -> StoreResult<()> {
        let command = VendorCommand::RemoveVendor(RemoveVendor {
            vendor_id,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.vendors.get(&vendor_id).ok_or_else(missing)?;
            if state.parts.any(|p| p.vendor_id() == vendor_id) {
                return Err(DomainError::conflict(format!(
                    "vendor {} still supplies parts; reassign or delete them first",
                    current.name()
                ))
                .into());
            }
            let (_, events) = decide(current, &command)?;
            let entries = state.journal_events(vendor_id.0, VENDOR, &events)?;
            state.vendors.remove(&vendor_id);
            tracing::info!("removed vendor {vendor_id}");
            Ok(((), entries))
        })
    }
}
