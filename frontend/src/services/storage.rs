use common::error::DashboardError;
use common::storage::KeyValueStore;
use web_sys::Storage;

/// `KeyValueStore` over `window.localStorage`.
///
/// Private browsing modes may deny access; every call then fails with
/// `DashboardError::Storage` and callers fall back to defaults.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct LocalStorageStore;

fn storage() -> Result<Storage, DashboardError> {
    web_sys::window()
        .ok_or_else(|| DashboardError::Storage("no window".to_string()))?
        .local_storage()
        .map_err(|e| DashboardError::Storage(format!("{:?}", e)))?
        .ok_or_else(|| DashboardError::Storage("localStorage unavailable".to_string()))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashboardError> {
        storage()?
            .get_item(key)
            .map_err(|e| DashboardError::Storage(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        storage()?
            .set_item(key, value)
            .map_err(|e| DashboardError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), DashboardError> {
        storage()?
            .remove_item(key)
            .map_err(|e| DashboardError::Storage(format!("{:?}", e)))
    }
}
