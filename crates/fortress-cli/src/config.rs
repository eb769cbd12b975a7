use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct FortressConfig {
    pub store: StoreSection,
    pub identity: IdentitySection,
    #[serde(default)]
    pub vault: VaultSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentitySection {
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize, Default)]
pub struct VaultSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl fmt::Debug for VaultSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSection")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    #[serde(default = "default_insecure_defaults")]
    pub insecure_defaults: bool,
    #[serde(default)]
    pub idle_lock_seconds: u64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            insecure_defaults: default_insecure_defaults(),
            idle_lock_seconds: 0,
        }
    }
}

fn default_insecure_defaults() -> bool {
    true
}

impl FortressConfig {
    pub fn new(
        store_path: PathBuf,
        user_id: Uuid,
        secret: Option<String>,
        insecure_defaults: bool,
        idle_lock_seconds: u64,
    ) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            identity: IdentitySection { user_id },
            vault: VaultSection { secret },
            security: SecuritySection {
                insecure_defaults,
                idle_lock_seconds,
            },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<FortressConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Write the config, readable by the owner only.
pub fn write_config(path: &Path, config: &FortressConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open config {}: {}", path.display(), e))?;

    // The creation mode does not apply to a file that already existed.
    restrict_permissions(&file).map_err(|e| {
        anyhow::anyhow!(
            "Failed to set permissions on {}: {}",
            path.display(),
            e
        )
    })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("fortress"));
        }
    }
    Ok(home_dir()?.join(".config").join("fortress"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("fortress"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("fortress"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let user = Uuid::new_v4();
        let contents = format!(
            "[store]\npath = \"/tmp/notes.db\"\n\n[identity]\nuser_id = \"{}\"\n",
            user
        );
        let config: FortressConfig = toml::from_str(&contents).unwrap();
        assert_eq!(config.identity.user_id, user);
        assert!(config.vault.secret.is_none());
        assert!(config.security.insecure_defaults);
        assert_eq!(config.security.idle_lock_seconds, 0);
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let user = Uuid::new_v4();
        let config = FortressConfig::new(
            PathBuf::from("/data/notes.db"),
            user,
            Some("s3cret".to_string()),
            false,
            300,
        );

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.store.path, "/data/notes.db");
        assert_eq!(loaded.identity.user_id, user);
        assert_eq!(loaded.vault.secret.as_deref(), Some("s3cret"));
        assert!(!loaded.security.insecure_defaults);
        assert_eq!(loaded.security.idle_lock_seconds, 300);
    }

    #[cfg(unix)]
    #[test]
    fn test_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = FortressConfig::new(PathBuf::from("notes.db"), Uuid::new_v4(), None, true, 0);
        write_config(&path, &config).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_narrows_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# placeholder\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut config =
            FortressConfig::new(PathBuf::from("notes.db"), Uuid::new_v4(), None, true, 0);
        config.vault.secret = Some("s3cret".to_string());
        write_config(&path, &config).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let loaded = read_config(&path).unwrap();
        assert_eq!(loaded.vault.secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let section = VaultSection {
            secret: Some("hunter2".to_string()),
        };
        let rendered = format!("{:?}", section);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
