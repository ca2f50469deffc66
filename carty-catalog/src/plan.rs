use carty_shared::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanTier {
    Max,
    Plus,
    Basic,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Max, PlanTier::Plus, PlanTier::Basic];

    pub fn name(self) -> &'static str {
        match self {
            PlanTier::Max => "Max",
            PlanTier::Plus => "Plus",
            PlanTier::Basic => "Basic",
        }
    }

    pub fn plan(self) -> &'static ProtectionPlan {
        match self {
            PlanTier::Max => &PLANS[0],
            PlanTier::Plus => &PLANS[1],
            PlanTier::Basic => &PLANS[2],
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlanTier {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanTier::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownPlan(s.to_string()))
    }
}

/// Protection plan offered on the car detail page. Fees are fixed client-side.
#[derive(Debug, PartialEq)]
pub struct ProtectionPlan {
    pub tier: PlanTier,
    pub fee: Money,
    pub description: &'static str,
    pub benefits: &'static [&'static str],
}

pub static PLANS: [ProtectionPlan; 3] = [
    ProtectionPlan {
        tier: PlanTier::Max,
        fee: Money::from_rupees(600),
        description: "Only pay Rs. 3000 in case of any incidentals",
        benefits: &[
            "Full Damage Waiver",
            "Free Roadside Assistance",
            "Zero Deductible",
            "Priority Support",
        ],
    },
    ProtectionPlan {
        tier: PlanTier::Plus,
        fee: Money::from_rupees(550),
        description: "Moderate coverage & assistance",
        benefits: &[
            "Partial Damage Waiver",
            "Free Roadside Assistance",
            "₹10,000 Deductible",
        ],
    },
    ProtectionPlan {
        tier: PlanTier::Basic,
        fee: Money::from_rupees(459),
        description: "Essential protection for budget trips",
        benefits: &["Third-party liability coverage", "Paid Roadside Assistance"],
    },
];

pub fn plans() -> &'static [ProtectionPlan] {
    &PLANS
}
