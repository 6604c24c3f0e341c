use std::io;
use std::path::Path;

/// Raw filesystem size figures for the filesystem containing a path, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FsSpace {
    pub capacity: u64,
    pub free: u64,
}

pub trait PlatformExtensions {
    fn filesystem_space(path: &Path) -> io::Result<FsSpace>;
}

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform_impl;
#[cfg(windows)]
use windows as platform_impl;

pub fn filesystem_space(path: &Path) -> io::Result<FsSpace> {
    platform_impl::Platform::filesystem_space(path)
}
