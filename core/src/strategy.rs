//! Campaign strategy presets.
//!
//! A strategy is a named default filter configuration. Each preset lists
//! the dimensions it narrows and the rule used to narrow them; the rules
//! are evaluated against the universe observed in the data, never against
//! hardcoded label lists for the derived or risk dimensions.

use crate::{rfm::RfmSegment, types::Dimension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Manual,
    Shield,
    FastCash,
    RoughDiamonds,
    Lazarus,
}

/// How a preset narrows one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    /// Keep only these RFM segments.
    Segments(&'static [RfmSegment]),
    /// Keep values containing any of these substrings (case-sensitive).
    ContainsAny(&'static [&'static str]),
}

impl Narrowing {
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::Segments(segments) => {
                RfmSegment::from_label(value).is_some_and(|s| segments.contains(&s))
            }
            Self::ContainsAny(needles) => needles.iter().any(|n| value.contains(n)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrowingRule {
    pub dimension: Dimension,
    pub narrowing: Narrowing,
}

const fn rule(dimension: Dimension, narrowing: Narrowing) -> NarrowingRule {
    NarrowingRule { dimension, narrowing }
}

const HIGH_VALUE: Narrowing = Narrowing::ContainsAny(&["Oro", "Diamante"]);

const SHIELD_RULES: &[NarrowingRule] = &[
    rule(
        Dimension::RfmSegment,
        Narrowing::Segments(&[
            RfmSegment::Champions,
            RfmSegment::LoyalVips,
            RfmSegment::HighPotential,
        ]),
    ),
    rule(Dimension::ChurnRiskCategory, Narrowing::ContainsAny(&["Alta", "Muy alta"])),
    rule(Dimension::ValuePotential, HIGH_VALUE),
];

const FAST_CASH_RULES: &[NarrowingRule] = &[
    rule(Dimension::RepurchaseSegment, Narrowing::ContainsAny(&["Alta", "Muy Alta"])),
    rule(
        Dimension::RfmSegment,
        Narrowing::Segments(&[
            RfmSegment::RecentQuality,
            RfmSegment::NewBigSpenders,
            RfmSegment::RecentStandard,
        ]),
    ),
];

const ROUGH_DIAMONDS_RULES: &[NarrowingRule] = &[
    rule(
        Dimension::RfmSegment,
        Narrowing::Segments(&[
            RfmSegment::NewCustomers,
            RfmSegment::PromisingQuality,
            RfmSegment::Standard,
        ]),
    ),
    rule(Dimension::ValuePotential, HIGH_VALUE),
];

const LAZARUS_RULES: &[NarrowingRule] = &[
    rule(
        Dimension::RfmSegment,
        Narrowing::Segments(&[
            RfmSegment::CriticalToRetain,
            RfmSegment::AtRisk,
            RfmSegment::AboutToSleep,
        ]),
    ),
    rule(Dimension::ValuePotential, Narrowing::ContainsAny(&["Oro", "Plata"])),
];

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Self::Manual,
        Self::Shield,
        Self::FastCash,
        Self::RoughDiamonds,
        Self::Lazarus,
    ];

    /// Name shown in the preset selector.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Manual        => "Manual / Todos",
            Self::Shield        => "Escudo de Oro (Retención VIP)",
            Self::FastCash      => "Caja Rápida (Conversión)",
            Self::RoughDiamonds => "Diamantes en Bruto (Upselling)",
            Self::Lazarus       => "Operación Lázaro (Reactivación)",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Self::Manual        => "Manual/All",
            Self::Shield        => "Shield (VIP Retention)",
            Self::FastCash      => "Fast Cash (Conversion)",
            Self::RoughDiamonds => "Rough Diamonds (Upsell)",
            Self::Lazarus       => "Lazarus (Reactivation)",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Manual        => "manual",
            Self::Shield        => "shield",
            Self::FastCash      => "fast_cash",
            Self::RoughDiamonds => "rough_diamonds",
            Self::Lazarus       => "lazarus",
        }
    }

    /// One-line campaign objective.
    pub fn description(self) -> &'static str {
        match self {
            Self::Manual        => "Control total de filtros. Sin pre-selecciones automáticas.",
            Self::Shield        => "Evitar fuga de valor. Clientes VIP con alto riesgo.",
            Self::FastCash      => "Flujo de caja. Clientes con propensión alta.",
            Self::RoughDiamonds => "Crecer cuentas. Clientes nuevos con CLV futuro alto.",
            Self::Lazarus       => "Recuperar cuentas. Clientes valiosos inactivos.",
        }
    }

    pub fn rules(self) -> &'static [NarrowingRule] {
        match self {
            Self::Manual        => &[],
            Self::Shield        => SHIELD_RULES,
            Self::FastCash      => FAST_CASH_RULES,
            Self::RoughDiamonds => ROUGH_DIAMONDS_RULES,
            Self::Lazarus       => LAZARUS_RULES,
        }
    }

    /// Match a display name, English name or slug (trimmed, any case).
    pub fn recognise(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| {
            [s.display_name(), s.english_name(), s.slug()]
                .iter()
                .any(|candidate| candidate.to_lowercase() == wanted)
        })
    }

    /// Like `recognise`, but unknown identifiers resolve to `Manual`.
    pub fn parse(name: &str) -> Self {
        Self::recognise(name).unwrap_or_else(|| {
            log::warn!("Unknown strategy '{name}', falling back to manual selection");
            Self::Manual
        })
    }
}
