use anyhow::{bail, Context, Result};
use haulplan_core::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// `$HAULPLAN_HOME`, else `~/.haulplan`.
pub fn haulplan_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HAULPLAN_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".haulplan"))
}

pub fn ensure_haulplan_home() -> Result<PathBuf> {
    let dir = haulplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn state_path() -> Result<PathBuf> {
    Ok(ensure_haulplan_home()?.join("state.json"))
}

pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let snapshot = serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(snapshot))
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("serialize state")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn load_state() -> Result<Snapshot> {
    let p = state_path()?;
    match read_snapshot(&p)? {
        Some(snapshot) => Ok(snapshot),
        None => bail!("No state at {}. Run: haulplan init", p.display()),
    }
}

pub fn save_state(snapshot: &Snapshot) -> Result<()> {
    write_snapshot(&state_path()?, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_survives_a_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        assert!(read_snapshot(&path).unwrap().is_none());

        let seeded = Snapshot::seeded();
        write_snapshot(&path, &seeded).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), Some(seeded));
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
