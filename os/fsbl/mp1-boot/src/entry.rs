//! The one entry point a load session may accept.

use log::{error, info};
use mp1_memory::PhysicalAddress;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EntryPointError {
    #[error("more than one kernel image with a valid entry point found: keeping {accepted}, ignoring {rejected}")]
    AlreadyAccepted {
        accepted: PhysicalAddress,
        rejected: PhysicalAddress,
    },
}

/// Holds at most one accepted entry point. The first offer wins.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct EntryPointSlot(Option<PhysicalAddress>);

impl EntryPointSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Accept `entry` if nothing has been accepted yet.
    ///
    /// # Errors
    /// [`EntryPointError::AlreadyAccepted`] if the slot is taken. The slot keeps
    /// its value; the caller logs and carries on.
    pub fn offer(&mut self, entry: PhysicalAddress) -> Result<(), EntryPointError> {
        match self.0 {
            Some(accepted) => {
                let err = EntryPointError::AlreadyAccepted {
                    accepted,
                    rejected: entry,
                };
                error!("{err}");
                Err(err)
            }
            None => {
                info!("Setting entry point to {entry}");
                self.0 = Some(entry);
                Ok(())
            }
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> Option<PhysicalAddress> {
        self.0
    }

    pub const fn reset(&mut self) {
        self.0 = None;
    }
}
