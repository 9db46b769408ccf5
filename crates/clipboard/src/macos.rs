use crate::ClipboardProvider;
use anyhow::{anyhow, Result};
use cocoa::base::{id, nil};
use cocoa::foundation::{NSArray, NSAutoreleasePool, NSString};
use objc::runtime::NO;
use objc::{msg_send, sel, sel_impl};
use std::path::PathBuf;

pub struct MacosClipboard;

impl MacosClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacosClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardProvider for MacosClipboard {
    fn set_files(&self, files: Vec<PathBuf>) -> Result<()> {
        unsafe {
            let _pool = NSAutoreleasePool::new(nil);
            let ns_pasteboard: id = msg_send![objc::class!(NSPasteboard), generalPasteboard];

            let urls: Vec<id> = files
                .iter()
                .map(|file| {
                    let ns_path = NSString::alloc(nil).init_str(&file.to_string_lossy());
                    let url: id = msg_send![objc::class!(NSURL), fileURLWithPath: ns_path];
                    url
                })
                .collect();
            let objects = NSArray::arrayWithObjects(nil, &urls);

            let _: isize = msg_send![ns_pasteboard, clearContents];
            let written: objc::runtime::BOOL = msg_send![ns_pasteboard, writeObjects: objects];
            if written == NO {
                return Err(anyhow!("NSPasteboard rejected {} file URL(s)", files.len()));
            }
        }

        log::debug!("Placed {} file(s) on the pasteboard", files.len());
        Ok(())
    }
}
