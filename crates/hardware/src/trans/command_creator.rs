//! Close-page command creation.

use crate::addressmapping::AddressMapper;
use crate::common::{AccessType, IdGenerator};
use crate::signal::{Command, CommandKind, SubTransaction};

/// Converts a sub-transaction into the command that serves it.
pub trait CommandCreator: Send {
    /// Returns the requested command for `st`.
    fn create(&self, st: &SubTransaction) -> Command;
}

/// Always closes the row after the access.
///
/// Reads become `ReadPrecharge` and writes become `WritePrecharge`; the bank decides which
/// prerequisite (activate or precharge) has to run first.
pub struct ClosePageCommandCreator {
    mapper: Box<dyn AddressMapper>,
    ids: IdGenerator,
}

impl ClosePageCommandCreator {
    /// Creates a command creator that locates sub-transactions with `mapper`.
    pub fn new(mapper: Box<dyn AddressMapper>, ids: IdGenerator) -> Self {
        Self { mapper, ids }
    }
}

impl std::fmt::Debug for ClosePageCommandCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosePageCommandCreator").finish_non_exhaustive()
    }
}

impl CommandCreator for ClosePageCommandCreator {
    fn create(&self, st: &SubTransaction) -> Command {
        let kind = match st.access {
            AccessType::Read => CommandKind::ReadPrecharge,
            AccessType::Write => CommandKind::WritePrecharge,
        };
        let location = self.mapper.map(st.address);
        Command::new(self.ids.next_id(), kind, location, Some(st.clone()))
    }
}
