use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

const APPLICATION_DIR: &str = "habitlog";

/// Directory holding the entry store and logs. Uses `%APPDATA%` on Windows and
/// `$XDG_STATE_HOME` (or `$HOME/.local/state`) elsewhere.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = {
        #[cfg(windows)]
        {
            env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))?
        }
        #[cfg(not(windows))]
        {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?
        }
    };
    path.push(APPLICATION_DIR);

    create_dir(path)
}

pub fn create_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
