use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::{FsSpace, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn filesystem_space(path: &Path) -> io::Result<FsSpace> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut stat = MaybeUninit::<libc::statvfs>::zeroed();
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        let stat = unsafe { stat.assume_init() };

        // Block counts are in units of f_frsize, not f_bsize.
        #[allow(clippy::unnecessary_cast)] // field widths differ between libc targets
        let fragment = stat.f_frsize as u64;
        #[allow(clippy::unnecessary_cast)]
        let (blocks, free_blocks) = (stat.f_blocks as u64, stat.f_bfree as u64);

        Ok(FsSpace {
            capacity: blocks.saturating_mul(fragment),
            free: free_blocks.saturating_mul(fragment),
        })
    }
}
