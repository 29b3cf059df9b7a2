// PID file management for the daemon process

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage for the single daemon PID record
///
/// Every call goes to the backing store; implementations must not cache.
pub trait PidStore {
    /// Location of the record
    fn path(&self) -> &Path;

    /// Read the recorded PID, or `None` if there is no valid one
    fn read(&self) -> Option<u32>;

    /// Record `pid`, creating the containing directory first
    fn write(&self, pid: u32) -> Result<()>;

    /// Delete the record; errors are swallowed
    fn remove(&self);
}

/// PID record kept as decimal text in a file
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PidStore for PidFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<u32> {
        let content = fs::read_to_string(&self.path).ok()?;
        parse_pid(&content)
    }

    fn write(&self, pid: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(pid.to_string().as_bytes())?;

        // mode() only applies on creation; tighten a pre-existing file too
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn remove(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("Ignoring PID file removal failure for {}: {}", self.path.display(), e);
        }
    }
}

/// Parse PID file content. Only strictly positive integers that fit a pid are accepted.
pub(crate) fn parse_pid(content: &str) -> Option<u32> {
    let value: i64 = content.trim().parse().ok()?;
    if value <= 0 || value > i64::from(i32::MAX) {
        return None;
    }
    u32::try_from(value).ok()
}
