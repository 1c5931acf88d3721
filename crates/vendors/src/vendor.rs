use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Aggregate, AggregateRoot, DomainError, require_non_blank, typed_id};
use stockroom_events::Event;

typed_id!(
    /// Vendor identifier.
    VendorId
);

/// Contact information for a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update of a vendor; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Loose `local@domain.tld` shape check: no whitespace, one `@`, a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Aggregate root: Vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vendor {
    id: VendorId,
    name: String,
    contact: ContactInfo,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    removed: bool,
}

impl Vendor {
    /// Create an empty, not-yet-registered aggregate instance.
    pub fn empty(id: VendorId) -> Self {
        Self {
            id,
            name: String::new(),
            contact: ContactInfo::default(),
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> VendorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for Vendor {
    type Id = VendorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterVendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterVendor {
    pub vendor_id: VendorId,
    pub name: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateVendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVendor {
    pub vendor_id: VendorId,
    pub patch: VendorPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveVendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveVendor {
    pub vendor_id: VendorId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorCommand {
    RegisterVendor(RegisterVendor),
    UpdateVendor(UpdateVendor),
    RemoveVendor(RemoveVendor),
}

/// Event: VendorRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRegistered {
    pub vendor_id: VendorId,
    pub name: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VendorUpdated (carries the full post-update details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorUpdated {
    pub vendor_id: VendorId,
    pub name: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VendorRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRemoved {
    pub vendor_id: VendorId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorEvent {
    VendorRegistered(VendorRegistered),
    VendorUpdated(VendorUpdated),
    VendorRemoved(VendorRemoved),
}

impl Event for VendorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VendorEvent::VendorRegistered(_) => "vendors.vendor.registered",
            VendorEvent::VendorUpdated(_) => "vendors.vendor.updated",
            VendorEvent::VendorRemoved(_) => "vendors.vendor.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VendorEvent::VendorRegistered(e) => e.occurred_at,
            VendorEvent::VendorUpdated(e) => e.occurred_at,
            VendorEvent::VendorRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Vendor {
    type Command = VendorCommand;
    type Event = VendorEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            VendorEvent::VendorRegistered(e) => {
                self.id = e.vendor_id;
                self.name = e.name.clone();
                self.contact = e.contact.clone();
                self.created = true;
            }
            VendorEvent::VendorUpdated(e) => {
                self.name = e.name.clone();
                self.contact = e.contact.clone();
            }
            VendorEvent::VendorRemoved(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            VendorCommand::RegisterVendor(cmd) => self.handle_register(cmd),
            VendorCommand::UpdateVendor(cmd) => self.handle_update(cmd),
            VendorCommand::RemoveVendor(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Vendor {
    fn ensure_live(&self, vendor_id: VendorId) -> Result<(), DomainError> {
        if !self.created || self.removed {
            return Err(DomainError::not_found());
        }
        if self.id != vendor_id {
            return Err(DomainError::invariant("vendor_id mismatch"));
        }
        Ok(())
    }

    fn validate_contact(contact: &ContactInfo) -> Result<(), DomainError> {
        match contact.email.as_deref() {
            Some(email) if !email.is_empty() && !is_valid_email(email) => Err(
                DomainError::validation(format!("'{email}' is not a valid email address")),
            ),
            _ => Ok(()),
        }
    }

    fn handle_register(&self, cmd: &RegisterVendor) -> Result<Vec<VendorEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("vendor already exists"));
        }
        require_non_blank("name", &cmd.name)?;
        Self::validate_contact(&cmd.contact)?;

        Ok(vec![VendorEvent::VendorRegistered(VendorRegistered {
            vendor_id: cmd.vendor_id,
            name: cmd.name.trim().to_string(),
            contact: cmd.contact.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateVendor) -> Result<Vec<VendorEvent>, DomainError> {
        self.ensure_live(cmd.vendor_id)?;

        let patch = &cmd.patch;
        let name = patch.name.clone().unwrap_or_else(|| self.name.clone());
        require_non_blank("name", &name)?;

        let contact = ContactInfo {
            contact_person: patch.contact_person.clone().or_else(|| self.contact.contact_person.clone()),
            email: patch.email.clone().or_else(|| self.contact.email.clone()),
            phone: patch.phone.clone().or_else(|| self.contact.phone.clone()),
            address: patch.address.clone().or_else(|| self.contact.address.clone()),
        };
        Self::validate_contact(&contact)?;

        Ok(vec![VendorEvent::VendorUpdated(VendorUpdated {
            vendor_id: cmd.vendor_id,
            name: name.trim().to_string(),
            contact,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveVendor) -> Result<Vec<VendorEvent>, DomainError> {
        self.ensure_live(cmd.vendor_id)?;

        Ok(vec![VendorEvent::VendorRemoved(VendorRemoved {
            vendor_id: cmd.vendor_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
