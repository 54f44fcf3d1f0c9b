//! User-facing notices for startup problems.

/// Shows a one-off message to the user
pub trait Notifier: Send {
    fn notify(&self, title: &str, message: &str);
}

/// Blocking message box on Windows, the way the host's other plugins report problems
#[cfg(windows)]
pub struct MessageBoxNotifier;

#[cfg(windows)]
impl Notifier for MessageBoxNotifier {
    fn notify(&self, title: &str, message: &str) {
        use std::ffi::OsStr;
        use std::iter::once;
        use std::os::windows::ffi::OsStrExt;
        use std::ptr;
        use winapi::um::winuser::{MessageBoxW, MB_ICONWARNING, MB_OK};

        let wide = |s: &str| -> Vec<u16> { OsStr::new(s).encode_wide().chain(once(0)).collect() };
        let title = wide(title);
        let message = wide(message);

        unsafe {
            MessageBoxW(
                ptr::null_mut(),
                message.as_ptr(),
                title.as_ptr(),
                MB_OK | MB_ICONWARNING,
            );
        }
    }
}

/// Notices go to the log only
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        log::error!("[{}] {}", title, message);
    }
}

pub fn default_notifier() -> Box<dyn Notifier> {
    #[cfg(windows)]
    {
        Box::new(MessageBoxNotifier)
    }
    #[cfg(not(windows))]
    {
        Box::new(LogNotifier)
    }
}
