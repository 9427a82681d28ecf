use crate::domain::{RegisterState, StoreError};
use shared_types::Address;

/// Durable mapping from register address to current [`RegisterState`].
///
/// Writes replace the whole state; there is no partial update. Callers that
/// read-modify-write must hold a [`crate::RegisterLease`] on the address.
pub trait RegisterStore: Send + Sync {
    fn read(&self, address: &Address) -> Result<Option<RegisterState>, StoreError>;

    fn write(&self, address: &Address, state: &RegisterState) -> Result<(), StoreError>;

    fn contains(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.read(address)?.is_some())
    }
}

impl<S: RegisterStore + ?Sized> RegisterStore for std::sync::Arc<S> {
    fn read(&self, address: &Address) -> Result<Option<RegisterState>, StoreError> {
        (**self).read(address)
    }

    fn write(&self, address: &Address, state: &RegisterState) -> Result<(), StoreError> {
        (**self).write(address, state)
    }
}
