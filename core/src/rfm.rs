//! The fixed RFM taxonomy and its display order.
//!
//! RULE: rank is intrinsic to the segment. Labels that are not part of
//! the taxonomy sort after every known segment at `UNRANKED`.

use serde::{Deserialize, Serialize};

/// Rank assigned to labels outside the taxonomy.
pub const UNRANKED: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum RfmSegment {
    Champions        = 1,
    LoyalVips        = 2,
    HighPotential    = 3,
    PotentialVips    = 4,
    RecentQuality    = 5,
    NewBigSpenders   = 6,
    RegularQuality   = 7,
    RecentStandard   = 8,
    Standard         = 9,
    PromisingQuality = 10,
    HighRiskValuable = 11,
    NewCustomers     = 12,
    LowEngagement    = 13,
    Passive          = 14,
    CriticalToRetain = 15,
    NeedAttention    = 16,
    AtRisk           = 17,
    LowPriority      = 18,
    AboutToSleep     = 19,
    Hibernating      = 20,
}

impl RfmSegment {
    /// Every segment, in rank order.
    pub const ALL: [RfmSegment; 20] = [
        Self::Champions,
        Self::LoyalVips,
        Self::HighPotential,
        Self::PotentialVips,
        Self::RecentQuality,
        Self::NewBigSpenders,
        Self::RegularQuality,
        Self::RecentStandard,
        Self::Standard,
        Self::PromisingQuality,
        Self::HighRiskValuable,
        Self::NewCustomers,
        Self::LowEngagement,
        Self::Passive,
        Self::CriticalToRetain,
        Self::NeedAttention,
        Self::AtRisk,
        Self::LowPriority,
        Self::AboutToSleep,
        Self::Hibernating,
    ];

    pub fn rank(self) -> u32 {
        self as u32
    }

    /// The label used in the scored customer table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Champions        => "Campeones",
            Self::LoyalVips        => "VIPs Leales",
            Self::HighPotential    => "Alto Potencial",
            Self::PotentialVips    => "VIPs Potenciales",
            Self::RecentQuality    => "Calidad Reciente",
            Self::NewBigSpenders   => "Nuevos Grandes Compradores",
            Self::RegularQuality   => "Calidad Regular",
            Self::RecentStandard   => "Estándar Reciente",
            Self::Standard         => "Estándar",
            Self::PromisingQuality => "Calidad Prometedora",
            Self::HighRiskValuable => "Alto Riesgo - Valiosos",
            Self::NewCustomers     => "Nuevos Clientes",
            Self::LowEngagement    => "Bajo Compromiso",
            Self::Passive          => "Pasivos",
            Self::CriticalToRetain => "Críticos a Retener",
            Self::NeedAttention    => "Necesitan Atención",
            Self::AtRisk           => "En Riesgo",
            Self::LowPriority      => "Baja Prioridad",
            Self::AboutToSleep     => "A Punto de Dormir",
            Self::Hibernating      => "Hibernando",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Display rank for any label; unknown labels get `UNRANKED`.
pub fn rank_of(label: &str) -> u32 {
    RfmSegment::from_label(label).map_or(UNRANKED, RfmSegment::rank)
}

/// Sort labels by rank. Unranked labels keep a stable lexical order.
pub fn sort_by_rank(labels: &mut [String]) {
    labels.sort_by(|a, b| rank_of(a).cmp(&rank_of(b)).then_with(|| a.cmp(b)));
}
