//! The target platform value type.
//!
//! A [`TargetPlatform`] pairs a target triple with the pointer width the
//! triple implies. The explorer keeps two of them per run: the platform the
//! caller asked for and the one the parser resolved. The two may differ
//! legitimately and are reported side by side, never coerced into each other.

use serde::{Deserialize, Serialize};

use crate::arch::Architecture;
use crate::error::{Result, TargetError};

/// An immutable target platform: triple plus pointer width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawTargetPlatform")]
pub struct TargetPlatform {
    triple: String,
    pointer_width_bits: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawTargetPlatform {
    triple: String,
    #[serde(default)]
    pointer_width_bits: Option<u32>,
}

impl TryFrom<RawTargetPlatform> for TargetPlatform {
    type Error = TargetError;

    fn try_from(raw: RawTargetPlatform) -> Result<Self> {
        match raw.pointer_width_bits {
            Some(bits) => TargetPlatform::new(raw.triple, bits),
            None => TargetPlatform::from_triple(&raw.triple),
        }
    }
}

impl TargetPlatform {
    /// Create a platform from a triple and an explicit pointer width.
    ///
    /// This is how the parser-resolved platform is built: the parser reports
    /// both values and neither is second-guessed beyond basic validation.
    pub fn new(triple: impl Into<String>, pointer_width_bits: u32) -> Result<Self> {
        let triple = triple.into();
        validate_triple(&triple)?;
        if !matches!(pointer_width_bits, 16 | 32 | 64) {
            return Err(TargetError::InvalidPointerWidth {
                triple,
                bits: pointer_width_bits,
            });
        }
        Ok(Self {
            triple,
            pointer_width_bits,
        })
    }

    /// Create a platform from a triple, deriving the pointer width from its
    /// architecture component.
    pub fn from_triple(triple: &str) -> Result<Self> {
        validate_triple(triple)?;
        let arch = Architecture::parse(first_component(triple));
        let bits = arch
            .pointer_width_bits()
            .ok_or_else(|| TargetError::InvalidTriple {
                triple: triple.to_string(),
                detail: format!("unknown pointer width for architecture '{arch}'"),
            })?;
        Self::new(triple, bits)
    }

    /// The full target triple string.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// Pointer width in bits.
    pub fn pointer_width_bits(&self) -> u32 {
        self.pointer_width_bits
    }

    /// Pointer size in bytes.
    pub fn pointer_size_bytes(&self) -> u32 {
        self.pointer_width_bits / 8
    }

    /// The architecture component.
    pub fn architecture(&self) -> Architecture {
        Architecture::parse(first_component(&self.triple))
    }

    /// The vendor component (e.g. `pc`, `apple`, `unknown`).
    pub fn vendor(&self) -> &str {
        self.component(1).unwrap_or("unknown")
    }

    /// The operating system component (e.g. `linux`, `windows`, `darwin22.1.0`).
    pub fn operating_system(&self) -> Option<&str> {
        self.component(2)
    }

    /// The environment/ABI component (e.g. `gnu`, `msvc`), if present.
    pub fn environment(&self) -> Option<&str> {
        self.component(3)
    }

    fn component(&self, index: usize) -> Option<&str> {
        self.triple.split('-').nth(index)
    }

    /// Generic 64-bit Linux (GNU environment).
    pub fn x86_64_linux_gnu() -> Self {
        Self {
            triple: "x86_64-unknown-linux-gnu".to_string(),
            pointer_width_bits: 64,
        }
    }

    /// 64-bit Apple silicon macOS.
    pub fn aarch64_apple_darwin() -> Self {
        Self {
            triple: "aarch64-apple-darwin".to_string(),
            pointer_width_bits: 64,
        }
    }

    /// 64-bit Windows (MSVC environment).
    pub fn x86_64_windows_msvc() -> Self {
        Self {
            triple: "x86_64-pc-windows-msvc".to_string(),
            pointer_width_bits: 64,
        }
    }
}

impl Default for TargetPlatform {
    fn default() -> Self {
        Self::x86_64_linux_gnu()
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.triple)
    }
}

impl std::str::FromStr for TargetPlatform {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_triple(s)
    }
}

fn first_component(triple: &str) -> &str {
    triple.split('-').next().unwrap_or_default()
}

fn validate_triple(triple: &str) -> Result<()> {
    if triple.trim().is_empty() {
        return Err(TargetError::InvalidTriple {
            triple: triple.to_string(),
            detail: "empty triple".to_string(),
        });
    }
    let components: Vec<&str> = triple.split('-').collect();
    if components.len() < 2 {
        return Err(TargetError::InvalidTriple {
            triple: triple.to_string(),
            detail: "expected at least 'arch-vendor' components".to_string(),
        });
    }
    if components.iter().any(|c| c.is_empty()) {
        return Err(TargetError::InvalidTriple {
            triple: triple.to_string(),
            detail: "empty component".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_triple_derives_pointer_width() {
        let p = TargetPlatform::from_triple("x86_64-pc-windows-msvc").unwrap();
        assert_eq!(p.pointer_width_bits(), 64);
        assert_eq!(p.pointer_size_bytes(), 8);
        assert_eq!(p.architecture(), Architecture::X86_64);
        assert_eq!(p.vendor(), "pc");
        assert_eq!(p.operating_system(), Some("windows"));
        assert_eq!(p.environment(), Some("msvc"));

        let p = TargetPlatform::from_triple("i686-unknown-linux-gnu").unwrap();
        assert_eq!(p.pointer_size_bytes(), 4);
    }

    #[test]
    fn explicit_width_is_kept() {
        // x32 ABI: 64-bit architecture with 32-bit pointers.
        let p = TargetPlatform::new("x86_64-unknown-linux-gnux32", 32).unwrap();
        assert_eq!(p.pointer_width_bits(), 32);
        assert_eq!(p.triple(), "x86_64-unknown-linux-gnux32");
    }

    #[test]
    fn rejects_malformed_triples() {
        assert!(TargetPlatform::from_triple("").is_err());
        assert!(TargetPlatform::from_triple("x86_64").is_err());
        assert!(TargetPlatform::from_triple("x86_64--linux").is_err());
        assert!(TargetPlatform::from_triple("xtensa-esp32-none").is_err());
        assert!(TargetPlatform::new("x86_64-pc-linux", 48).is_err());
    }

    #[test]
    fn parse_via_from_str() {
        let p: TargetPlatform = "aarch64-apple-darwin".parse().unwrap();
        assert_eq!(p, TargetPlatform::aarch64_apple_darwin());
        assert_eq!(p.to_string(), "aarch64-apple-darwin");
    }

    #[test]
    fn serde_round_trip_validates() {
        let p = TargetPlatform::x86_64_windows_msvc();
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"pointer-width-bits\":64"));
        let back: TargetPlatform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let derived: TargetPlatform =
            serde_json::from_str(r#"{"triple":"wasm32-unknown-emscripten"}"#).unwrap();
        assert_eq!(derived.pointer_width_bits(), 32);

        let bad = serde_json::from_str::<TargetPlatform>(r#"{"triple":"nope"}"#);
        assert!(bad.is_err());
    }
}
