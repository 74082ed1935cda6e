//! Architecture component of a target triple.

use serde::{Deserialize, Serialize};

/// The CPU architecture named by the first component of a target triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Architecture {
    X86,
    X86_64,
    Arm,
    Aarch64,
    Riscv32,
    Riscv64,
    Wasm32,
    Wasm64,
    PowerPc,
    PowerPc64,
    Mips,
    Mips64,
    /// An architecture this crate has no table entry for.
    Other(String),
}

impl Architecture {
    /// Parse the architecture component of a triple.
    ///
    /// Unknown spellings are preserved as [`Architecture::Other`].
    pub fn parse(component: &str) -> Self {
        match component {
            "i386" | "i486" | "i586" | "i686" | "x86" => Architecture::X86,
            "x86_64" | "amd64" | "x86_64h" => Architecture::X86_64,
            "aarch64" | "arm64" | "arm64e" | "aarch64_be" => Architecture::Aarch64,
            "riscv32" => Architecture::Riscv32,
            "riscv64" => Architecture::Riscv64,
            "wasm32" => Architecture::Wasm32,
            "wasm64" => Architecture::Wasm64,
            "powerpc" | "ppc" => Architecture::PowerPc,
            "powerpc64" | "powerpc64le" | "ppc64" | "ppc64le" => Architecture::PowerPc64,
            "mips" | "mipsel" => Architecture::Mips,
            "mips64" | "mips64el" => Architecture::Mips64,
            other if other.starts_with("arm") || other.starts_with("thumb") => Architecture::Arm,
            other => Architecture::Other(other.to_string()),
        }
    }

    /// Natural pointer width in bits, if known.
    pub fn pointer_width_bits(&self) -> Option<u32> {
        match self {
            Architecture::X86
            | Architecture::Arm
            | Architecture::Riscv32
            | Architecture::Wasm32
            | Architecture::PowerPc
            | Architecture::Mips => Some(32),
            Architecture::X86_64
            | Architecture::Aarch64
            | Architecture::Riscv64
            | Architecture::Wasm64
            | Architecture::PowerPc64
            | Architecture::Mips64 => Some(64),
            Architecture::Other(_) => None,
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::Aarch64 => write!(f, "aarch64"),
            Architecture::Riscv32 => write!(f, "riscv32"),
            Architecture::Riscv64 => write!(f, "riscv64"),
            Architecture::Wasm32 => write!(f, "wasm32"),
            Architecture::Wasm64 => write!(f, "wasm64"),
            Architecture::PowerPc => write!(f, "powerpc"),
            Architecture::PowerPc64 => write!(f, "powerpc64"),
            Architecture::Mips => write!(f, "mips"),
            Architecture::Mips64 => write!(f, "mips64"),
            Architecture::Other(name) => write!(f, "{name}"),
        }
    }
}
