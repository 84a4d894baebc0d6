//! Target process discovery and read-only handles.
//!
//! Only Windows is supported; on other platforms every entry point returns
//! `Error::UnsupportedPlatform`.

use tracing::debug;

use crate::error::Result;

/// Executable and module name of the supported target.
pub const DEFAULT_PROCESS_NAME: &str = "D2R.exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub base_address: u64,
    pub size: u32,
}

/// An opened, read-only handle to the target process.
///
/// The OS handle is closed on drop.
pub struct ProcessHandle {
    pub pid: u32,
    pub base_address: u64,
    pub module_size: u32,
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .field("module_size", &format_args!("{:#x}", self.module_size))
            .finish()
    }
}

impl ProcessHandle {
    /// Find the target by executable name, then open it.
    pub fn find_and_open(process_name: &str, module_name: &str) -> Result<Self> {
        let pid = find_process_id(process_name)?;
        debug!("Found {} (PID: {})", process_name, pid);
        Self::open(pid, module_name)
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use std::ffi::c_void;

    use tracing::debug;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW, PROCESSENTRY32W,
        Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
        TH32CS_SNAPPROCESS,
    };
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    use super::{ModuleInfo, ProcessHandle};
    use crate::error::{Error, Result};

    fn wide_to_string(wide: &[u16]) -> String {
        let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
        String::from_utf16_lossy(&wide[..len])
    }

    /// Closes a Toolhelp snapshot when it goes out of scope.
    struct Snapshot(HANDLE);

    impl Drop for Snapshot {
        fn drop(&mut self) {
            // SAFETY: the handle came from CreateToolhelp32Snapshot and is closed once.
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }

    pub fn find_process_id(process_name: &str) -> Result<u32> {
        // SAFETY: snapshot creation has no preconditions; the handle is owned by `Snapshot`.
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map(Snapshot)
            .map_err(|e| Error::ProcessNotFound(format!("{}: {}", process_name, e)))?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: `entry` is a properly sized PROCESSENTRY32W owned by this frame.
        let mut found = unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_ok();
        while found {
            if wide_to_string(&entry.szExeFile).eq_ignore_ascii_case(process_name) {
                return Ok(entry.th32ProcessID);
            }
            // SAFETY: as above.
            found = unsafe { Process32NextW(snapshot.0, &mut entry) }.is_ok();
        }

        Err(Error::ProcessNotFound(process_name.to_string()))
    }

    pub fn find_module(pid: u32, module_name: &str) -> Result<ModuleInfo> {
        // SAFETY: snapshot creation has no preconditions; the handle is owned by `Snapshot`.
        let snapshot =
            unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
                .map(Snapshot)
                .map_err(|e| Error::ModuleNotFound(format!("{}: {}", module_name, e)))?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        // SAFETY: `entry` is a properly sized MODULEENTRY32W owned by this frame.
        let mut found = unsafe { Module32FirstW(snapshot.0, &mut entry) }.is_ok();
        while found {
            let name = wide_to_string(&entry.szModule);
            if name.eq_ignore_ascii_case(module_name) {
                return Ok(ModuleInfo {
                    name,
                    base_address: entry.modBaseAddr as u64,
                    size: entry.modBaseSize,
                });
            }
            // SAFETY: as above.
            found = unsafe { Module32NextW(snapshot.0, &mut entry) }.is_ok();
        }

        Err(Error::ModuleNotFound(module_name.to_string()))
    }

    impl ProcessHandle {
        /// Open a process by PID for reading, resolving `module_name` as the
        /// primary image.
        pub fn open(pid: u32, module_name: &str) -> Result<Self> {
            let module = find_module(pid, module_name)?;
            debug!(
                "Module {} at {:#x} ({:#x} bytes)",
                module.name, module.base_address, module.size
            );

            // SAFETY: OpenProcess has no memory preconditions; the handle is closed on drop.
            let handle =
                unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
                    .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;

            Ok(Self {
                pid,
                base_address: module.base_address,
                module_size: module.size,
                handle,
            })
        }

        /// Copy target memory into `buffer`, returning the number of bytes read.
        pub(crate) fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<usize> {
            let mut bytes_read = 0usize;
            // SAFETY: `buffer` is valid for `buffer.len()` writes; the remote address is
            // validated by the OS and a bad one only makes the call fail.
            unsafe {
                ReadProcessMemory(
                    self.handle,
                    address as *const c_void,
                    buffer.as_mut_ptr().cast(),
                    buffer.len(),
                    Some(&mut bytes_read),
                )
            }
            .map_err(|_| Error::ReadFailure {
                address,
                length: buffer.len(),
            })?;
            Ok(bytes_read)
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: the handle came from OpenProcess and is closed exactly once.
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod imp {
    use super::{ModuleInfo, ProcessHandle};
    use crate::error::{Error, Result};

    pub fn find_process_id(_process_name: &str) -> Result<u32> {
        Err(Error::UnsupportedPlatform)
    }

    pub fn find_module(_pid: u32, _module_name: &str) -> Result<ModuleInfo> {
        Err(Error::UnsupportedPlatform)
    }

    impl ProcessHandle {
        pub fn open(_pid: u32, _module_name: &str) -> Result<Self> {
            Err(Error::UnsupportedPlatform)
        }

        pub(crate) fn read_into(&self, _address: u64, _buffer: &mut [u8]) -> Result<usize> {
            Err(Error::UnsupportedPlatform)
        }
    }
}

pub use imp::{find_module, find_process_id};

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_unsupported_platform() {
        assert!(matches!(
            find_process_id(DEFAULT_PROCESS_NAME),
            Err(Error::UnsupportedPlatform)
        ));
        assert!(matches!(
            ProcessHandle::find_and_open(DEFAULT_PROCESS_NAME, DEFAULT_PROCESS_NAME),
            Err(Error::UnsupportedPlatform)
        ));
    }
}
