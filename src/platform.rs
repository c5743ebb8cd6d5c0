//! Path format translation between Windows and WSL hosts.

/// Kind of host the binary runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    /// Linux under the Windows Subsystem for Linux.
    Wsl,
    Other,
}

impl HostPlatform {
    /// Detect the current host.
    pub fn detect() -> Self {
        if cfg!(windows) {
            return Self::Windows;
        }
        let release = std::fs::read_to_string("/proc/sys/kernel/osrelease").unwrap_or_default();
        if cfg!(target_os = "linux") && release.to_lowercase().contains("microsoft") {
            Self::Wsl
        } else {
            Self::Other
        }
    }
}

/// Rewrite a user-supplied path for `host`.
///
/// On WSL `C:\dir\x` becomes `/mnt/c/dir/x`; on Windows `/mnt/c/dir/x`
/// becomes `C:\dir\x` and other forward slashes turn into backslashes.
/// Blank input yields `None`.
pub fn translate_path(input: &str, host: HostPlatform) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let translated = match host {
        HostPlatform::Wsl => match drive_letter(input) {
            Some(drive) => {
                let rest = input[2..].trim_start_matches('\\').replace('\\', "/");
                format!("/mnt/{}/{rest}", drive.to_ascii_lowercase())
            }
            None => input.to_string(),
        },
        HostPlatform::Windows => match mount_drive(input) {
            Some(drive) => {
                let rest = input[6..].trim_start_matches('/').replace('/', "\\");
                format!("{}:\\{rest}", drive.to_ascii_uppercase())
            }
            None => input.replace('/', "\\"),
        },
        HostPlatform::Other => input.to_string(),
    };

    Some(translated)
}

/// `C` for `C:...`.
fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let drive = chars.next().filter(char::is_ascii_alphabetic)?;
    (chars.next() == Some(':')).then_some(drive)
}

/// `c` for `/mnt/c...` with something after the drive.
fn mount_drive(path: &str) -> Option<char> {
    let rest = path.strip_prefix("/mnt/")?;
    let drive = rest.chars().next().filter(char::is_ascii_alphabetic)?;
    (rest.len() > 1).then_some(drive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_path_on_wsl() {
        assert_eq!(
            translate_path(r"  D:\Проекты\Том 2 ", HostPlatform::Wsl).as_deref(),
            Some("/mnt/d/Проекты/Том 2")
        );
        assert_eq!(
            translate_path("/home/user", HostPlatform::Wsl).as_deref(),
            Some("/home/user")
        );
    }

    #[test]
    fn test_mount_path_on_windows() {
        assert_eq!(
            translate_path("/mnt/c/data/x", HostPlatform::Windows).as_deref(),
            Some(r"C:\data\x")
        );
        assert_eq!(
            translate_path("shares/docs", HostPlatform::Windows).as_deref(),
            Some(r"shares\docs")
        );
    }

    #[test]
    fn test_blank_and_other_hosts() {
        assert_eq!(translate_path("   ", HostPlatform::Other), None);
        assert_eq!(
            translate_path(r"C:\x", HostPlatform::Other).as_deref(),
            Some(r"C:\x")
        );
    }
}
