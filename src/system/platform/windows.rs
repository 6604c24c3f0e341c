use std::io;
use std::path::{Path, PathBuf};

use sysinfo::Disks;

use super::{FsSpace, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn filesystem_space(path: &Path) -> io::Result<FsSpace> {
        let target = strip_verbatim(std::fs::canonicalize(path)?);
        let disks = Disks::new_with_refreshed_list();

        // Windows has no statvfs; pick the volume whose mount point is the
        // longest prefix of the requested path.
        let disk = disks
            .list()
            .iter()
            .filter(|d| target.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mounted volume contains {}", target.display()),
                )
            })?;

        Ok(FsSpace {
            capacity: disk.total_space(),
            free: disk.available_space(),
        })
    }
}

// canonicalize() yields `\\?\C:\...`; sysinfo reports mount points as `C:\`.
fn strip_verbatim(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(rest) => PathBuf::from(rest),
        None => path,
    }
}
