//! Compiler settings presets
//!
//! A preset is a named bundle of compiler settings (optimization level,
//! code generation pipeline) applied uniformly to one test pass. The set of
//! presets is closed: configuration naming anything outside it is rejected
//! before any side effect occurs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::Error;

/// EVM version targeted when the test definition does not pin one.
pub const CURRENT_EVM_VERSION: &str = "london";

/// A named compiler configuration preset.
///
/// Variant order is the catalog declaration order; selected presets are
/// executed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preset {
    LegacyNoOptimize,
    IrNoOptimize,
    LegacyOptimizeEvmOnly,
    IrOptimizeEvmOnly,
    LegacyOptimizeEvmYul,
    IrOptimizeEvmYul,
}

/// All presets, in declaration order.
static PRESETS: &[Preset] = &[
    Preset::LegacyNoOptimize,
    Preset::IrNoOptimize,
    Preset::LegacyOptimizeEvmOnly,
    Preset::IrOptimizeEvmOnly,
    Preset::LegacyOptimizeEvmYul,
    Preset::IrOptimizeEvmYul,
];

impl Preset {
    /// Get all presets in catalog declaration order
    pub fn all() -> &'static [Preset] {
        PRESETS
    }

    /// Canonical kebab-case name of the preset
    pub fn name(self) -> &'static str {
        match self {
            Preset::LegacyNoOptimize => "legacy-no-optimize",
            Preset::IrNoOptimize => "ir-no-optimize",
            Preset::LegacyOptimizeEvmOnly => "legacy-optimize-evm-only",
            Preset::IrOptimizeEvmOnly => "ir-optimize-evm-only",
            Preset::LegacyOptimizeEvmYul => "legacy-optimize-evm+yul",
            Preset::IrOptimizeEvmYul => "ir-optimize-evm+yul",
        }
    }

    /// Space-separated list of every valid preset name, for error messages
    pub fn valid_names() -> String {
        PRESETS
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PRESETS
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Preset \"{}\" not found. Please select one or more of the available presets: {}",
                    s,
                    Preset::valid_names()
                ))
            })
    }
}

impl Serialize for Preset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Compiler settings resolved from a preset, shaped like the standard-JSON
/// `settings` fragment the compiler consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub optimizer: OptimizerSettings,
    pub evm_version: String,
    #[serde(rename = "viaIR")]
    pub via_ir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub details: OptimizerDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerDetails {
    pub yul: bool,
}

impl CompilerSettings {
    fn new(evm_version: &str, via_ir: bool, optimizer: bool, yul: bool) -> Self {
        Self {
            optimizer: OptimizerSettings {
                enabled: optimizer,
                details: OptimizerDetails { yul },
            },
            evm_version: evm_version.to_string(),
            via_ir,
        }
    }
}

/// Resolve a preset into concrete compiler settings.
///
/// Pure: the output depends only on the preset and the EVM version.
pub fn settings_from_preset(preset: Preset, evm_version: &str) -> CompilerSettings {
    match preset {
        Preset::LegacyNoOptimize => CompilerSettings::new(evm_version, false, false, false),
        Preset::IrNoOptimize => CompilerSettings::new(evm_version, true, false, false),
        Preset::LegacyOptimizeEvmOnly => CompilerSettings::new(evm_version, false, true, false),
        Preset::IrOptimizeEvmOnly => CompilerSettings::new(evm_version, true, true, false),
        Preset::LegacyOptimizeEvmYul => CompilerSettings::new(evm_version, false, true, true),
        Preset::IrOptimizeEvmYul => CompilerSettings::new(evm_version, true, true, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_preset_is_deterministic() {
        for &preset in Preset::all() {
            assert_eq!(
                settings_from_preset(preset, "london"),
                settings_from_preset(preset, "london"),
            );
        }
    }

    #[test]
    fn preset_matrix() {
        let cases = [
            (Preset::LegacyNoOptimize, false, false, false),
            (Preset::IrNoOptimize, true, false, false),
            (Preset::LegacyOptimizeEvmOnly, false, true, false),
            (Preset::IrOptimizeEvmOnly, true, true, false),
            (Preset::LegacyOptimizeEvmYul, false, true, true),
            (Preset::IrOptimizeEvmYul, true, true, true),
        ];
        for (preset, via_ir, optimizer, yul) in cases {
            let settings = settings_from_preset(preset, "paris");
            assert_eq!(settings.via_ir, via_ir, "{preset}");
            assert_eq!(settings.optimizer.enabled, optimizer, "{preset}");
            assert_eq!(settings.optimizer.details.yul, yul, "{preset}");
            assert_eq!(settings.evm_version, "paris");
        }
    }

    #[test]
    fn parse_roundtrip() {
        for &preset in Preset::all() {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn unknown_preset_lists_valid_names() {
        let err = "ir-optimize-everything".parse::<Preset>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ir-optimize-everything"));
        for &preset in Preset::all() {
            assert!(message.contains(preset.name()), "missing {preset}");
        }
    }

    #[test]
    fn settings_serialize_to_standard_json_keys() {
        let settings = settings_from_preset(Preset::IrOptimizeEvmYul, "london");
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["optimizer"]["enabled"], true);
        assert_eq!(json["optimizer"]["details"]["yul"], true);
        assert_eq!(json["evmVersion"], "london");
        assert_eq!(json["viaIR"], true);
    }
}
