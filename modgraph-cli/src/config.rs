//! CLI 配置
//!
//! 包含 CLI 特有的配置：分阶段日志级别

use modgraph_config::Phase;
use tracing::Level;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub scan: Option<Level>,
    pub resolve: Option<Level>,
    pub check: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            scan: None,
            resolve: None,
            check: None,
        }
    }
}

impl LogConfig {
    pub fn new(global: Level) -> Self {
        Self {
            global,
            ..Self::default()
        }
    }

    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        match phase {
            Phase::Scan => self.scan.unwrap_or(self.global),
            Phase::Resolve => self.resolve.unwrap_or(self.global),
            Phase::Check => self.check.unwrap_or(self.global),
        }
    }

    /// Apply a `phase=level` override such as `resolve=debug`
    pub fn apply_override(&mut self, directive: &str) -> Result<(), String> {
        let (phase, level) = directive
            .split_once('=')
            .ok_or_else(|| format!("expected PHASE=LEVEL, got '{directive}'"))?;
        let level: Level = level
            .parse()
            .map_err(|_| format!("unknown log level '{level}'"))?;
        let slot = match phase {
            "scan" => &mut self.scan,
            "resolve" => &mut self.resolve,
            "check" => &mut self.check,
            other => return Err(format!("unknown phase '{other}'")),
        };
        *slot = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_falls_back_to_global() {
        let config = LogConfig::new(Level::INFO);
        assert_eq!(config.level_for(Phase::Scan), Level::INFO);
        assert_eq!(config.level_for(Phase::Check), Level::INFO);
    }

    #[test]
    fn test_phase_override() {
        let mut config = LogConfig::default();
        config.apply_override("resolve=debug").unwrap();
        assert_eq!(config.level_for(Phase::Resolve), Level::DEBUG);
        assert_eq!(config.level_for(Phase::Scan), Level::WARN);
    }

    #[test]
    fn test_bad_override() {
        let mut config = LogConfig::default();
        assert!(config.apply_override("resolve").is_err());
        assert!(config.apply_override("link=debug").is_err());
        assert!(config.apply_override("scan=loud").is_err());
    }
}
