use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "com";
pub const APP_ORG: &str = "notevault";
pub const APP_NAME: &str = "notevault";

pub const ENV_DATA_DIR: &str = "NOTEVAULT_DATA_DIR";
pub const ENV_DB: &str = "NOTEVAULT_DB";
pub const ENV_KEY_FILE: &str = "NOTEVAULT_KEY_FILE";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(override_path) = std::env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(override_path));
    }
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("cannot determine data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Flag, then environment, then `<data dir>/notes.db`.
pub fn db_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    resolve(flag, ENV_DB, "notes.db")
}

/// Flag, then environment, then `<data dir>/secret.key`.
pub fn key_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    resolve(flag, ENV_KEY_FILE, "secret.key")
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("settings.json"))
}

fn resolve(flag: Option<PathBuf>, env: &str, file_name: &str) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Ok(path) = std::env::var(env) {
        return Ok(PathBuf::from(path));
    }
    Ok(data_dir()?.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins() {
        let p = db_path(Some(PathBuf::from("/tmp/explicit.db"))).unwrap();
        assert_eq!(p, PathBuf::from("/tmp/explicit.db"));
        let k = key_path(Some(PathBuf::from("/tmp/explicit.key"))).unwrap();
        assert_eq!(k, PathBuf::from("/tmp/explicit.key"));
    }
}
