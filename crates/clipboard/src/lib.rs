pub mod traits;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub mod unix;

pub use traits::*;

#[cfg(target_os = "windows")]
pub type DefaultClipboard = windows::WindowsClipboard;

#[cfg(target_os = "macos")]
pub type DefaultClipboard = macos::MacosClipboard;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub type DefaultClipboard = unix::UnixClipboard;
