/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-CPU target profiles: port topology, ISA-set whitelist,
//! seeded resources, and port-name encoding/decoding.

use std::collections::HashSet;

use clap::ValueEnum;

use crate::error::ConfigError;
use crate::resource::{Port, PortSet};
use crate::write::{Resources, WriteRegistry};

/// The closed set of five target CPUs this crate knows how to generate a
/// scheduling model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetCpu {
    #[value(name = "alderlake-p")]
    AlderlakeP,
    #[value(name = "sapphirerapids")]
    SapphireRapids,
    #[value(name = "skylake")]
    Skylake,
    #[value(name = "skylake-avx512")]
    SkylakeServer,
    #[value(name = "icelake-server")]
    IcelakeServer,
}

/// How a PortSet is rendered into the target-description grammar's port-name
/// tokens: two-digit zero-padded ports for the 12-port families, single
/// digits for the ≤10-port families. Width is tied to the family
/// consistently on both the encode and decode side, so
/// `decode(encode(p)) == p` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortNameWidth {
    /// `<prefix>Port<d>(<d>)*` — bare concatenated single digits.
    Single,
    /// `<prefix>Port<dd>(_<dd>)*` — zero-padded two-digit, underscore joined.
    Double,
}

pub struct CpuProfile {
    pub cpu: TargetCpu,
    pub short_name: &'static str,
    pub model_name: &'static str,
    pub all_ports: PortSet,
    pub load_ports: PortSet,
    pub load_latency: i64,
    pub max_latency: i64,
    valid_isa_set: HashSet<&'static str>,
    port_name_width: PortNameWidth,
    /// Single-digit families additionally accept `<prefix>Divider` and
    /// `<prefix>FPDivider` as aliases for the invalid-port sentinel
    /// (supplemented feature, see SPEC_FULL.md).
    has_divider_alias: bool,
}

fn ports(nums: &[i8]) -> PortSet {
    PortSet::new(nums.iter().map(|&n| Port::new(n)).collect())
}

impl CpuProfile {
    pub fn for_cpu(cpu: TargetCpu) -> Self {
        match cpu {
            TargetCpu::AlderlakeP => CpuProfile {
                cpu,
                short_name: "ADLP",
                model_name: "AlderlakePModel",
                all_ports: ports(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
                load_ports: ports(&[2, 3, 11]),
                load_latency: 5,
                max_latency: 100,
                valid_isa_set: ALDERLAKE_P_ISA.iter().copied().collect(),
                port_name_width: PortNameWidth::Double,
                has_divider_alias: false,
            },
            TargetCpu::SapphireRapids => CpuProfile {
                cpu,
                short_name: "SPR",
                model_name: "SapphireRapidsModel",
                all_ports: ports(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
                load_ports: ports(&[2, 3, 11]),
                load_latency: 5,
                max_latency: 100,
                valid_isa_set: SAPPHIRE_RAPIDS_ISA.iter().copied().collect(),
                port_name_width: PortNameWidth::Double,
                has_divider_alias: false,
            },
            TargetCpu::Skylake => CpuProfile {
                cpu,
                short_name: "SKL",
                model_name: "SkylakeModel",
                all_ports: ports(&[0, 1, 2, 3, 4, 5, 6, 7]),
                load_ports: ports(&[2, 3]),
                load_latency: 5,
                max_latency: 100,
                valid_isa_set: SKYLAKE_ISA.iter().copied().collect(),
                port_name_width: PortNameWidth::Single,
                has_divider_alias: true,
            },
            TargetCpu::SkylakeServer => CpuProfile {
                cpu,
                short_name: "SKX",
                model_name: "SkylakeServerModel",
                all_ports: ports(&[0, 1, 2, 3, 4, 5, 6, 7]),
                load_ports: ports(&[2, 3]),
                load_latency: 5,
                max_latency: 100,
                valid_isa_set: SKYLAKE_SERVER_ISA.iter().copied().collect(),
                port_name_width: PortNameWidth::Single,
                has_divider_alias: true,
            },
            TargetCpu::IcelakeServer => CpuProfile {
                cpu,
                short_name: "ICX",
                model_name: "IcelakeServerModel",
                all_ports: ports(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
                load_ports: ports(&[2, 3]),
                load_latency: 5,
                max_latency: 100,
                valid_isa_set: ICELAKE_SERVER_ISA.iter().copied().collect(),
                port_name_width: PortNameWidth::Single,
                has_divider_alias: true,
            },
        }
    }

    pub fn is_isa_valid(&self, isa_set: Option<&str>) -> bool {
        match isa_set {
            None => true,
            Some(tag) => self.valid_isa_set.contains(tag),
        }
    }

    pub fn lat2str(&self, latency: i64) -> String {
        if latency == self.max_latency {
            format!("{}.MaxLatency", self.model_name)
        } else {
            latency.to_string()
        }
    }

    /// Encode a PortSet into the grammar's port-name token.
    pub fn encode_port_name(&self, set: &PortSet) -> String {
        if set.is_empty() {
            return String::new();
        }
        if *set == self.all_ports {
            return format!("{}PortAny", self.short_name);
        }
        if *set == PortSet::invalid() {
            return format!("{}PortInvalid", self.short_name);
        }
        let mut nums: Vec<i8> = set.as_slice().iter().map(|p| p.number()).collect();
        nums.sort();
        match self.port_name_width {
            PortNameWidth::Single => {
                let digits: String = nums.iter().map(|n| n.to_string()).collect();
                format!("{}Port{}", self.short_name, digits)
            }
            PortNameWidth::Double => {
                let joined = nums
                    .iter()
                    .map(|n| format!("{n:02}"))
                    .collect::<Vec<_>>()
                    .join("_");
                format!("{}Port{}", self.short_name, joined)
            }
        }
    }

    /// Inverse of [`CpuProfile::encode_port_name`].
    pub fn decode_port_name(&self, name: &str) -> Result<PortSet, ConfigError> {
        if name == format!("{}PortAny", self.short_name) {
            return Ok(self.all_ports.clone());
        }
        if name == format!("{}PortInvalid", self.short_name) {
            return Ok(PortSet::invalid());
        }
        if self.has_divider_alias
            && (name == format!("{}Divider", self.short_name) || name == format!("{}FPDivider", self.short_name))
        {
            return Ok(PortSet::invalid());
        }
        let prefix = format!("{}Port", self.short_name);
        let rest = name
            .strip_prefix(&prefix)
            .ok_or_else(|| ConfigError::MalformedPortName { name: name.to_string() })?;

        let nums: Vec<i8> = match self.port_name_width {
            PortNameWidth::Single => rest
                .chars()
                .map(|c| {
                    c.to_digit(10)
                        .map(|d| d as i8)
                        .ok_or_else(|| ConfigError::MalformedPortName { name: name.to_string() })
                })
                .collect::<Result<_, _>>()?,
            PortNameWidth::Double => {
                if rest.is_empty() {
                    Vec::new()
                } else {
                    rest.split('_')
                        .map(|chunk| {
                            chunk
                                .parse::<i8>()
                                .map_err(|_| ConfigError::MalformedPortName { name: name.to_string() })
                        })
                        .collect::<Result<_, _>>()?
                }
            }
        };

        let port_set = ports(&nums);
        for p in port_set.as_slice() {
            if !self.all_ports.as_slice().contains(p) {
                return Err(ConfigError::MalformedPortName { name: name.to_string() });
            }
        }
        Ok(port_set)
    }

    /// Seed the small set of "always-known" writes every inference run is
    /// anchored to. `WriteZero`/`WriteLoad` exist on every
    /// profile; Alderlake-P and Sapphire Rapids additionally seed the richer
    /// set the original source hand-tunes for those two CPUs (SPEC_FULL.md
    /// supplement #3), since both are decoupled micro-architectures with
    /// enough measured outliers that letting Pass 2 infer them from scratch
    /// would pick the wrong candidate on at least one bucket.
    pub fn seed_writes(&self, registry: &mut WriteRegistry) -> Result<(), ConfigError> {
        registry
            .register_seeded("WriteZero", false, Resources::new(Vec::new(), Vec::new(), 1, 1))
            .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;
        registry
            .register_seeded(
                "WriteLoad",
                false,
                Resources::new(vec![self.load_ports.clone()], vec![1], self.load_latency, 1),
            )
            .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;

        if matches!(self.cpu, TargetCpu::AlderlakeP | TargetCpu::SapphireRapids) {
            let port_04_09 = ports(&[4, 9]);
            let port_07_08 = ports(&[7, 8]);

            registry
                .register_seeded(
                    "WriteIMulH",
                    true,
                    Resources::new(Vec::new(), Vec::new(), 3, 1),
                )
                .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;
            registry
                .register_seeded(
                    "WriteIMulHLd",
                    true,
                    Resources::new(Vec::new(), Vec::new(), 3, 1),
                )
                .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;
            registry
                .register_seeded(
                    "WriteRMW",
                    true,
                    Resources::new(
                        vec![self.load_ports.clone(), port_04_09, port_07_08],
                        vec![1, 1, 1],
                        1,
                        3,
                    ),
                )
                .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;
            registry
                .register_seeded(
                    "WriteVecMaskedGatherWriteback",
                    true,
                    Resources::new(Vec::new(), Vec::new(), self.load_latency, 0),
                )
                .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;

            if matches!(self.cpu, TargetCpu::SapphireRapids) {
                let port_00_06 = ports(&[0, 6]);
                registry
                    .register_seeded(
                        "WriteCMOV",
                        false,
                        Resources::new(vec![port_00_06], vec![1], 1, 1),
                    )
                    .map_err(|e| ConfigError::SeedConflict { detail: e.to_string() })?;
            }
        }

        Ok(())
    }
}

macro_rules! isa_set {
    ($($name:ident = $list:expr;)*) => {
        $(const $name: &[&str] = &$list;)*
    };
}

isa_set! {
    ALDERLAKE_P_ISA = [
        "3DNOW_PREFETCH", "ADOX_ADCX", "AES", "AVX", "AVX2", "AVX2GATHER", "AVXAES", "AVX_GFNI",
        "AVX_VNNI", "BMI1", "BMI2", "CET", "CLDEMOTE", "CLFLUSHOPT", "CLFSH", "CLWB", "CMOV",
        "CMPXCHG16B", "F16C", "FAT_NOP", "FCMOV", "FMA", "FXSAVE", "FXSAVE64", "GFNI", "HRESET",
        "I186", "I286PROTECTED", "I286REAL", "I386", "I486", "I486REAL", "I86", "INVPCID",
        "KEYLOCKER", "KEYLOCKER_WIDE", "LAHF", "LONGMODE", "LZCNT", "MONITOR", "MOVBE", "MOVDIR",
        "PAUSE", "PCLMULQDQ", "PCONFIG", "PENTIUMMMX", "PENTIUMREAL", "PKU", "POPCNT", "PPRO",
        "PPRO_UD0_SHORT", "PREFETCHW", "PREFETCH_NOP", "PTWRITE", "RDPID", "RDPMC", "RDRAND",
        "RDSEED", "RDTSCP", "RDWRFSGS", "SERIALIZE", "SHA", "SMAP", "SMX", "SSE", "SSE2",
        "SSE2MMX", "SSE3", "SSE3X87", "SSE4", "SSE42", "SSEMXCSR", "SSE_PREFETCH", "SSSE3",
        "SSSE3MMX", "VAES", "VMFUNC", "VPCLMULQDQ", "VTX", "WAITPKG", "WBNOINVD", "X87", "XSAVE",
        "XSAVEC", "XSAVEOPT", "XSAVES",
    ];
    SAPPHIRE_RAPIDS_ISA = [
        "3DNOW_PREFETCH", "ADOX_ADCX", "AES", "AMX_BF16", "AMX_INT8", "AMX_TILE", "AVX", "AVX2",
        "AVX2GATHER", "AVX512BW_128", "AVX512BW_128N", "AVX512BW_256", "AVX512BW_512",
        "AVX512BW_KOP", "AVX512CD_128", "AVX512CD_256", "AVX512CD_512", "AVX512DQ_128",
        "AVX512DQ_128N", "AVX512DQ_256", "AVX512DQ_512", "AVX512DQ_KOP", "AVX512DQ_SCALAR",
        "AVX512F_128", "AVX512F_128N", "AVX512F_256", "AVX512F_512", "AVX512F_KOP",
        "AVX512F_SCALAR", "AVX512_BF16_128", "AVX512_BF16_256", "AVX512_BF16_512",
        "AVX512_BITALG_128", "AVX512_BITALG_256", "AVX512_BITALG_512", "AVX512_FP16_128",
        "AVX512_FP16_128N", "AVX512_FP16_256", "AVX512_FP16_512", "AVX512_FP16_SCALAR",
        "AVX512_GFNI_128", "AVX512_GFNI_256", "AVX512_GFNI_512", "AVX512_IFMA_128",
        "AVX512_IFMA_256", "AVX512_IFMA_512", "AVX512_VAES_128", "AVX512_VAES_256",
        "AVX512_VAES_512", "AVX512_VBMI2_128", "AVX512_VBMI2_256", "AVX512_VBMI2_512",
        "AVX512_VBMI_128", "AVX512_VBMI_256", "AVX512_VBMI_512", "AVX512_VNNI_128",
        "AVX512_VNNI_256", "AVX512_VNNI_512", "AVX512_VP2INTERSECT_128",
        "AVX512_VP2INTERSECT_256", "AVX512_VP2INTERSECT_512", "AVX512_VPCLMULQDQ_128",
        "AVX512_VPCLMULQDQ_256", "AVX512_VPCLMULQDQ_512", "AVX512_VPOPCNTDQ_128",
        "AVX512_VPOPCNTDQ_256", "AVX512_VPOPCNTDQ_512", "AVXAES", "AVX_GFNI", "AVX_VNNI", "BMI1",
        "BMI2", "CET", "CLDEMOTE", "CLFLUSHOPT", "CLFSH", "CLWB", "CMOV", "CMPXCHG16B", "ENQCMD",
        "F16C", "FAT_NOP", "FCMOV", "FMA", "FXSAVE", "FXSAVE64", "GFNI", "I186", "I286PROTECTED",
        "I286REAL", "I386", "I486", "I486REAL", "I86", "INVPCID", "LAHF", "LONGMODE", "LZCNT",
        "MONITOR", "MOVBE", "MOVDIR", "PAUSE", "PCLMULQDQ", "PCONFIG", "PENTIUMMMX",
        "PENTIUMREAL", "PKU", "POPCNT", "PPRO", "PPRO_UD0_LONG", "PREFETCHW", "PREFETCH_NOP",
        "PTWRITE", "RDPID", "RDPMC", "RDRAND", "RDSEED", "RDTSCP", "RDWRFSGS", "RTM", "SERIALIZE",
        "SGX", "SGX_ENCLV", "SHA", "SMAP", "SMX", "SSE", "SSE2", "SSE2MMX", "SSE3", "SSE3X87",
        "SSE4", "SSE42", "SSEMXCSR", "SSE_PREFETCH", "SSSE3", "SSSE3MMX", "TDX", "TSX_LDTRK",
        "UINTR", "VAES", "VMFUNC", "VPCLMULQDQ", "VTX", "WAITPKG", "WBNOINVD", "X87", "XSAVE",
        "XSAVEC", "XSAVEOPT", "XSAVES",
    ];
    SKYLAKE_ISA = [
        "3DNOW_PREFETCH", "ADOX_ADCX", "AES", "AVX", "AVX2", "AVX2GATHER", "AVXAES", "BMI1",
        "BMI2", "CLFLUSHOPT", "CLFSH", "CMOV", "CMPXCHG16B", "F16C", "FAT_NOP", "FCMOV", "FMA",
        "FXSAVE", "FXSAVE64", "I186", "I286PROTECTED", "I286REAL", "I386", "I486", "I486REAL",
        "I86", "INVPCID", "LAHF", "LONGMODE", "LZCNT", "MONITOR", "MOVBE", "MPX", "PAUSE",
        "PCLMULQDQ", "PENTIUMMMX", "PENTIUMREAL", "POPCNT", "PPRO", "PPRO_UD0_LONG", "PREFETCHW",
        "PREFETCH_NOP", "RDPMC", "RDRAND", "RDSEED", "RDTSCP", "RDWRFSGS", "RTM", "SGX", "SMAP",
        "SMX", "SSE", "SSE2", "SSE2MMX", "SSE3", "SSE3X87", "SSE4", "SSE42", "SSEMXCSR",
        "SSE_PREFETCH", "SSSE3", "SSSE3MMX", "VMFUNC", "VTX", "X87", "XSAVE", "XSAVEC",
        "XSAVEOPT", "XSAVES",
    ];
    SKYLAKE_SERVER_ISA = [
        "3DNOW_PREFETCH", "ADOX_ADCX", "AES", "AVX", "AVX2", "AVX2GATHER", "AVX512BW_128",
        "AVX512BW_128N", "AVX512BW_256", "AVX512BW_512", "AVX512BW_KOP", "AVX512CD_128",
        "AVX512CD_256", "AVX512CD_512", "AVX512DQ_128", "AVX512DQ_128N", "AVX512DQ_256",
        "AVX512DQ_512", "AVX512DQ_KOP", "AVX512DQ_SCALAR", "AVX512F_128", "AVX512F_128N",
        "AVX512F_256", "AVX512F_512", "AVX512F_KOP", "AVX512F_SCALAR", "AVXAES", "BMI1", "BMI2",
        "CLFLUSHOPT", "CLFSH", "CLWB", "CMOV", "CMPXCHG16B", "F16C", "FAT_NOP", "FCMOV", "FMA",
        "FXSAVE", "FXSAVE64", "I186", "I286PROTECTED", "I286REAL", "I386", "I486", "I486REAL",
        "I86", "INVPCID", "LAHF", "LONGMODE", "LZCNT", "MONITOR", "MOVBE", "MPX", "PAUSE",
        "PCLMULQDQ", "PENTIUMMMX", "PENTIUMREAL", "PKU", "POPCNT", "PPRO", "PPRO_UD0_LONG",
        "PREFETCHW", "PREFETCH_NOP", "RDPMC", "RDRAND", "RDSEED", "RDTSCP", "RDWRFSGS", "RTM",
        "SGX", "SMAP", "SMX", "SSE", "SSE2", "SSE2MMX", "SSE3", "SSE3X87", "SSE4", "SSE42",
        "SSEMXCSR", "SSE_PREFETCH", "SSSE3", "SSSE3MMX", "VMFUNC", "VTX", "X87", "XSAVE",
        "XSAVEC", "XSAVEOPT", "XSAVES",
    ];
    ICELAKE_SERVER_ISA = [
        "3DNOW_PREFETCH", "ADOX_ADCX", "AES", "AVX", "AVX2", "AVX2GATHER", "AVX512BW_128",
        "AVX512BW_128N", "AVX512BW_256", "AVX512BW_512", "AVX512BW_KOP", "AVX512CD_128",
        "AVX512CD_256", "AVX512CD_512", "AVX512DQ_128", "AVX512DQ_128N", "AVX512DQ_256",
        "AVX512DQ_512", "AVX512DQ_KOP", "AVX512DQ_SCALAR", "AVX512F_128", "AVX512F_128N",
        "AVX512F_256", "AVX512F_512", "AVX512F_KOP", "AVX512F_SCALAR", "AVX512_BITALG_128",
        "AVX512_BITALG_256", "AVX512_BITALG_512", "AVX512_GFNI_128", "AVX512_GFNI_256",
        "AVX512_GFNI_512", "AVX512_IFMA_128", "AVX512_IFMA_256", "AVX512_IFMA_512",
        "AVX512_VAES_128", "AVX512_VAES_256", "AVX512_VAES_512", "AVX512_VBMI2_128",
        "AVX512_VBMI2_256", "AVX512_VBMI2_512", "AVX512_VBMI_128", "AVX512_VBMI_256",
        "AVX512_VBMI_512", "AVX512_VNNI_128", "AVX512_VNNI_256", "AVX512_VNNI_512",
        "AVX512_VPCLMULQDQ_128", "AVX512_VPCLMULQDQ_256", "AVX512_VPCLMULQDQ_512",
        "AVX512_VPOPCNTDQ_128", "AVX512_VPOPCNTDQ_256", "AVX512_VPOPCNTDQ_512", "AVXAES",
        "AVX_GFNI", "BMI1", "BMI2", "CLFLUSHOPT", "CLFSH", "CLWB", "CMOV", "CMPXCHG16B", "F16C",
        "FAT_NOP", "FCMOV", "FCOMI", "FMA", "FXSAVE", "FXSAVE64", "GFNI", "I186", "I286PROTECTED",
        "I286REAL", "I386", "I486", "I486REAL", "I86", "INVPCID", "LAHF", "LONGMODE", "LZCNT",
        "MONITOR", "MOVBE", "PAUSE", "PCLMULQDQ", "PCONFIG", "PENTIUMMMX", "PENTIUMREAL", "PKU",
        "POPCNT", "PPRO", "PPRO_UD0_LONG", "PREFETCHW", "PREFETCH_NOP", "RDPID", "RDPMC",
        "RDRAND", "RDSEED", "RDTSCP", "RDWRFSGS", "RTM", "SGX", "SGX_ENCLV", "SHA", "SMAP", "SMX",
        "SSE", "SSE2", "SSE2MMX", "SSE3", "SSE3X87", "SSE4", "SSE42", "SSEMXCSR", "SSE_PREFETCH",
        "SSSE3", "SSSE3MMX", "VAES", "VMFUNC", "VPCLMULQDQ", "VTX", "WBNOINVD", "X87", "XSAVE",
        "XSAVEC", "XSAVEOPT", "XSAVES",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adlp_port_name_round_trips() {
        let profile = CpuProfile::for_cpu(TargetCpu::AlderlakeP);
        let set = ports(&[1, 3]);
        let name = profile.encode_port_name(&set);
        assert_eq!(name, "ADLPPort01_03");
        assert_eq!(profile.decode_port_name(&name).unwrap(), set);
    }

    #[test]
    fn adlp_port_any_and_invalid_round_trip() {
        let profile = CpuProfile::for_cpu(TargetCpu::AlderlakeP);
        assert_eq!(profile.encode_port_name(&profile.all_ports), "ADLPPortAny");
        assert_eq!(
            profile.decode_port_name("ADLPPortAny").unwrap(),
            profile.all_ports
        );
        let invalid = PortSet::invalid();
        assert_eq!(profile.encode_port_name(&invalid), "ADLPPortInvalid");
        assert_eq!(profile.decode_port_name("ADLPPortInvalid").unwrap(), invalid);
    }

    #[test]
    fn icelake_server_single_digit_round_trips() {
        let profile = CpuProfile::for_cpu(TargetCpu::IcelakeServer);
        let set = ports(&[1, 3, 9]);
        let name = profile.encode_port_name(&set);
        assert_eq!(name, "ICXPort139");
        assert_eq!(profile.decode_port_name(&name).unwrap(), set);
    }

    #[test]
    fn skylake_divider_alias_decodes_to_invalid() {
        let profile = CpuProfile::for_cpu(TargetCpu::Skylake);
        assert_eq!(
            profile.decode_port_name("SKLDivider").unwrap(),
            PortSet::invalid()
        );
        assert_eq!(
            profile.decode_port_name("SKLFPDivider").unwrap(),
            PortSet::invalid()
        );
    }

    #[test]
    fn decode_rejects_port_outside_topology() {
        let profile = CpuProfile::for_cpu(TargetCpu::Skylake);
        assert!(profile.decode_port_name("SKLPort9").is_err());
    }

    #[test]
    fn seed_writes_are_universal_plus_family_specific() {
        let mut reg = WriteRegistry::new();
        CpuProfile::for_cpu(TargetCpu::Skylake).seed_writes(&mut reg).unwrap();
        assert!(reg.get("WriteZero").is_some());
        assert!(reg.get("WriteLoad").is_some());
        assert!(reg.get("WriteRMW").is_none());

        let mut reg = WriteRegistry::new();
        CpuProfile::for_cpu(TargetCpu::SapphireRapids)
            .seed_writes(&mut reg)
            .unwrap();
        assert!(reg.get("WriteCMOV").is_some());
        assert!(reg.get("WriteRMW").is_some());

        let mut reg = WriteRegistry::new();
        CpuProfile::for_cpu(TargetCpu::AlderlakeP).seed_writes(&mut reg).unwrap();
        assert!(reg.get("WriteRMW").is_some());
        assert!(reg.get("WriteCMOV").is_none());
    }

    #[test]
    fn isa_validity_whitelist() {
        let profile = CpuProfile::for_cpu(TargetCpu::SkylakeServer);
        assert!(profile.is_isa_valid(None));
        assert!(profile.is_isa_valid(Some("AVX512F_512")));
        assert!(!profile.is_isa_valid(Some("AMX_TILE")));
    }
}
