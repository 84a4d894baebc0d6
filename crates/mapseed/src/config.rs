//! Target selection settings.

use crate::memory::DEFAULT_PROCESS_NAME;
use crate::profile::TargetProfile;

/// Which process to open and how much of its image to scan.
///
/// The layout offsets themselves are fixed by [`TargetProfile`]; only the
/// target's identity and the scan extent are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Executable name to look for
    pub process_name: String,
    /// Module holding the signature; defaults to the executable itself
    pub module_name: Option<String>,
    /// Open this PID instead of searching by name
    pub pid: Option<u32>,
    /// Override for the profile's scan size
    pub scan_size: Option<u64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            module_name: None,
            pid: None,
            scan_size: None,
        }
    }
}

impl TargetConfig {
    pub fn builder() -> TargetConfigBuilder {
        TargetConfigBuilder::default()
    }

    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or(&self.process_name)
    }

    /// Apply the overrides in this config to `profile`.
    pub fn apply(&self, profile: &TargetProfile) -> TargetProfile {
        TargetProfile {
            scan_size: self.scan_size.unwrap_or(profile.scan_size),
            ..*profile
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TargetConfigBuilder {
    process_name: Option<String>,
    module_name: Option<String>,
    pid: Option<u32>,
    scan_size: Option<u64>,
}

impl TargetConfigBuilder {
    pub fn process_name<S: Into<String>>(mut self, name: S) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn module_name<S: Into<String>>(mut self, name: S) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn scan_size(mut self, size: u64) -> Self {
        self.scan_size = Some(size);
        self
    }

    pub fn build(self) -> TargetConfig {
        let default = TargetConfig::default();
        TargetConfig {
            process_name: self.process_name.unwrap_or(default.process_name),
            module_name: self.module_name,
            pid: self.pid,
            scan_size: self.scan_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TargetConfig::default();
        assert_eq!(config.process_name, "D2R.exe");
        assert_eq!(config.module_name(), "D2R.exe");
        assert_eq!(config.pid, None);
        assert_eq!(config.apply(&TargetProfile::D2R), TargetProfile::D2R);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TargetConfig::builder()
            .process_name("Game.exe")
            .module_name("engine.dll")
            .pid(4242)
            .scan_size(0x2000)
            .build();
        assert_eq!(config.module_name(), "engine.dll");
        assert_eq!(config.pid, Some(4242));

        let profile = config.apply(&TargetProfile::D2R);
        assert_eq!(profile.scan_size, 0x2000);
        assert_eq!(profile.act_offset, TargetProfile::D2R.act_offset);
    }

    #[test]
    fn test_module_defaults_to_process_name() {
        let config = TargetConfig::builder().process_name("Other.exe").build();
        assert_eq!(config.module_name(), "Other.exe");
    }
}
