use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{MonitorError, MonitorResult};
use crate::shops::types::{ConnectionStatus, ShopId, ShopPatch, ShopRecord};

/// Owner of the shop collection.
///
/// The monitor reads the initial records once and then only reports partial
/// updates back; it never adds or removes shops.
pub trait ShopDataSource: Send + Sync {
    fn load_shops(&self) -> MonitorResult<Vec<ShopRecord>>;

    fn update_shop(&self, id: &ShopId, patch: &ShopPatch) -> MonitorResult<()>;
}

/// Collection held in memory. Every merged patch is also kept, in order.
#[derive(Debug, Default)]
pub struct InMemoryShopSource {
    shops: Mutex<Vec<ShopRecord>>,
    updates: Mutex<Vec<(ShopId, ShopPatch)>>,
}

impl InMemoryShopSource {
    pub fn new(shops: Vec<ShopRecord>) -> Self {
        Self {
            shops: Mutex::new(shops),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// A small group of shops covering every combination of flags.
    pub fn demo() -> Self {
        Self::new(vec![
            ShopRecord::new("shop-001", "Flagship Store", ConnectionStatus::Disconnected, true),
            ShopRecord::new("shop-002", "Outlet Store", ConnectionStatus::Connected, false),
            ShopRecord::new("shop-003", "Home Goods", ConnectionStatus::Disconnected, false),
            ShopRecord::new("shop-004", "Lighting Studio", ConnectionStatus::Connected, true),
            ShopRecord::new("shop-005", "Kids Corner", ConnectionStatus::Disconnected, true),
        ])
    }

    pub fn snapshot(&self) -> Vec<ShopRecord> {
        lock(&self.shops).map(|s| s.clone()).unwrap_or_default()
    }

    pub fn applied_updates(&self) -> Vec<(ShopId, ShopPatch)> {
        lock(&self.updates).map(|u| u.clone()).unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MonitorResult<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| MonitorError::LockPoisoned("shop collection"))
}

fn merge(shops: &mut [ShopRecord], id: &ShopId, patch: &ShopPatch) -> MonitorResult<()> {
    let shop = shops
        .iter_mut()
        .find(|s| &s.id == id)
        .ok_or_else(|| MonitorError::UnknownShop(id.clone()))?;
    shop.apply(patch);
    Ok(())
}

impl ShopDataSource for InMemoryShopSource {
    fn load_shops(&self) -> MonitorResult<Vec<ShopRecord>> {
        Ok(lock(&self.shops)?.clone())
    }

    fn update_shop(&self, id: &ShopId, patch: &ShopPatch) -> MonitorResult<()> {
        merge(&mut lock(&self.shops)?, id, patch)?;
        lock(&self.updates)?.push((id.clone(), patch.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }

    fn name(self) -> &'static str {
        match self {
            FileFormat::Toml => "TOML",
            FileFormat::Json => "JSON",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ShopFile {
    #[serde(default)]
    shops: Vec<ShopRecord>,
}

/// Shop collection stored as a `[[shops]]` TOML file or a `{"shops": [...]}`
/// JSON file. Patches are merged and written straight back.
#[derive(Debug)]
pub struct FileShopSource {
    path: PathBuf,
    format: FileFormat,
    write_lock: Mutex<()>,
}

impl FileShopSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self {
            path,
            format,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> MonitorResult<ShopFile> {
        let content = std::fs::read_to_string(&self.path)?;
        let file = match self.format {
            FileFormat::Toml => toml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };
        Ok(file)
    }

    fn write(&self, file: &ShopFile) -> MonitorResult<()> {
        let content = match self.format {
            FileFormat::Toml => toml::to_string_pretty(file)?,
            FileFormat::Json => serde_json::to_string_pretty(file)?,
        };
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl ShopDataSource for FileShopSource {
    fn load_shops(&self) -> MonitorResult<Vec<ShopRecord>> {
        let file = self.read()?;
        info!(
            path = %self.path.display(),
            format = self.format.name(),
            count = file.shops.len(),
            "Loaded shops from file"
        );
        Ok(file.shops)
    }

    fn update_shop(&self, id: &ShopId, patch: &ShopPatch) -> MonitorResult<()> {
        let _guard = lock(&self.write_lock)?;
        let mut file = self.read()?;
        merge(&mut file.shops, id, patch)?;
        self.write(&file)?;
        debug!(path = %self.path.display(), shop_id = %id, "Wrote shop update");
        Ok(())
    }
}
