use crate::traits::ClipboardProvider;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use windows::Win32::Foundation::{GlobalFree, BOOL, HANDLE, HWND, POINT};
use windows::Win32::System::DataExchange::{
    CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
};
use windows::Win32::System::Memory::{GlobalAlloc, GlobalLock, GlobalUnlock, GMEM_MOVEABLE};
use windows::Win32::UI::Shell::DROPFILES;

const CF_HDROP: u32 = 15;

pub struct WindowsClipboard;

impl WindowsClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardProvider for WindowsClipboard {
    fn set_files(&self, files: Vec<PathBuf>) -> Result<()> {
        // DROPFILES header followed by NUL-terminated UTF-16 paths and a final NUL.
        let mut total_size = std::mem::size_of::<DROPFILES>();
        let mut paths_wide = Vec::with_capacity(files.len());
        for file in &files {
            let mut wide: Vec<u16> = file.to_string_lossy().encode_utf16().collect();
            wide.push(0);
            total_size += wide.len() * 2;
            paths_wide.push(wide);
        }
        total_size += 2;

        unsafe {
            OpenClipboard(HWND(0)).map_err(|e| anyhow!("Failed to open clipboard: {}", e))?;
            let _ = EmptyClipboard();

            let h_global = match GlobalAlloc(GMEM_MOVEABLE, total_size) {
                Ok(h) => h,
                Err(e) => {
                    let _ = CloseClipboard();
                    return Err(anyhow!("GlobalAlloc failed: {}", e));
                }
            };
            let ptr = GlobalLock(h_global);
            if ptr.is_null() {
                let _ = GlobalFree(h_global);
                let _ = CloseClipboard();
                return Err(anyhow!("GlobalLock failed"));
            }

            let dropfiles = DROPFILES {
                pFiles: std::mem::size_of::<DROPFILES>() as u32,
                pt: POINT { x: 0, y: 0 },
                fNC: BOOL(0),
                fWide: BOOL(1),
            };
            std::ptr::copy_nonoverlapping(&dropfiles, ptr as *mut DROPFILES, 1);

            let mut offset = std::mem::size_of::<DROPFILES>();
            for wide in &paths_wide {
                std::ptr::copy_nonoverlapping(
                    wide.as_ptr(),
                    (ptr as usize + offset) as *mut u16,
                    wide.len(),
                );
                offset += wide.len() * 2;
            }
            std::ptr::write_bytes((ptr as usize + offset) as *mut u8, 0, 2);

            let _ = GlobalUnlock(h_global);

            // On success the clipboard owns the allocation.
            if let Err(e) = SetClipboardData(CF_HDROP, HANDLE(h_global.0 as isize)) {
                let _ = GlobalFree(h_global);
                let _ = CloseClipboard();
                return Err(anyhow!("SetClipboardData failed: {}", e));
            }

            let _ = CloseClipboard();
        }

        log::debug!("Placed {} file(s) on the clipboard", files.len());
        Ok(())
    }
}
