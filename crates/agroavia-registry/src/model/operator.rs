use agroavia_core::{generate_id, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Availability of an aviation operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    #[default]
    #[serde(alias = "активен")]
    Active,
    #[serde(alias = "неактивен")]
    Inactive,
    #[serde(alias = "в ремонте")]
    UnderRepair,
}

impl OperatorStatus {
    pub const ALL: [OperatorStatus; 3] = [Self::Active, Self::Inactive, Self::UnderRepair];

    /// Label shown in the Russian interface
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "активен",
            Self::Inactive => "неактивен",
            Self::UnderRepair => "в ремонте",
        }
    }
}

impl std::fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::UnderRepair => write!(f, "under_repair"),
        }
    }
}

impl FromStr for OperatorStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s) || status.label() == s)
            .ok_or_else(|| {
                ValidationError::invalid("status", format!("unknown operator status '{s}'"))
            })
    }
}

/// One aircraft type in an operator's fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Aircraft {
    pub id: String,
    /// Model designation, e.g. "АН-2"
    #[serde(rename = "type", alias = "name")]
    pub kind: String,
    /// Number of airframes of this type
    pub count: u32,
    /// Working speed, km/h
    pub speed: f64,
    /// Spray swath width, m
    pub spread_width: f64,
    /// Tank capacity, l
    pub tank_capacity: f64,
    /// Cost of one flight hour
    pub hour_cost: f64,
}

impl Default for Aircraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: String::new(),
            count: 1,
            speed: 0.0,
            spread_width: 0.0,
            tank_capacity: 0.0,
            hour_cost: 0.0,
        }
    }
}

impl Aircraft {
    /// Area covered per unit of hourly cost: `speed × width / hour_cost`.
    ///
    /// A zero cost counts as 1; a negative cost yields 0.
    pub fn efficiency(&self) -> f64 {
        let cost = if self.hour_cost == 0.0 {
            1.0
        } else {
            self.hour_cost
        };
        if cost > 0.0 {
            self.speed * self.spread_width / cost
        } else {
            0.0
        }
    }

    fn is_typed(&self) -> bool {
        !self.kind.trim().is_empty()
    }

    /// Airframes this row stands for; an unset count counts as one
    pub fn units(&self) -> u32 {
        self.count.max(1)
    }
}

/// Count-weighted fleet characteristics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FleetTotals {
    pub total_aircraft: u32,
    pub avg_speed: f64,
    pub avg_width: f64,
    pub total_tank_capacity: f64,
    pub avg_hour_cost: f64,
}

impl FleetTotals {
    /// Totals over typed aircraft, weighted by [`Aircraft::units`]
    pub fn of(aircraft: &[Aircraft]) -> Self {
        let mut totals = Self::default();
        for ac in aircraft.iter().filter(|ac| ac.is_typed()) {
            let units = ac.units();
            let n = f64::from(units);
            totals.total_aircraft = totals.total_aircraft.saturating_add(units);
            totals.avg_speed += ac.speed * n;
            totals.avg_width += ac.spread_width * n;
            totals.total_tank_capacity += ac.tank_capacity * n;
            totals.avg_hour_cost += ac.hour_cost * n;
        }
        if totals.total_aircraft > 0 {
            let n = f64::from(totals.total_aircraft);
            totals.avg_speed /= n;
            totals.avg_width /= n;
            totals.avg_hour_cost /= n;
        }
        totals
    }
}

/// Per-operator summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorStats {
    pub total_orders: usize,
    pub completed_orders: usize,
    /// Orders in progress
    pub active_orders: usize,
    pub total_aircraft: u32,
    pub aircraft_types: usize,
}

/// An aviation company fulfilling orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pilot: String,
    #[serde(default, alias = "contact")]
    pub phone: String,
    #[serde(default)]
    pub status: OperatorStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, alias = "aircraft")]
    pub aircrafts: Vec<Aircraft>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Operator {
    /// Fleet totals of this operator
    pub fn fleet(&self) -> FleetTotals {
        FleetTotals::of(&self.aircrafts)
    }

    /// Number of airframes, as counted by [`FleetTotals`]
    pub fn total_aircraft(&self) -> u32 {
        self.fleet().total_aircraft
    }

    /// Distinct aircraft types, comma separated
    pub fn aircraft_types(&self) -> String {
        self.aircrafts
            .iter()
            .map(|ac| ac.kind.as_str())
            .filter(|kind| !kind.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Editable attributes of an operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorForm {
    pub name: String,
    pub pilot: String,
    pub phone: String,
    pub status: OperatorStatus,
    pub notes: String,
    pub aircrafts: Vec<Aircraft>,
}

impl Default for OperatorForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            pilot: String::new(),
            phone: String::new(),
            status: OperatorStatus::Active,
            notes: String::new(),
            aircrafts: vec![Aircraft::default()],
        }
    }
}

impl OperatorForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if self.aircrafts.is_empty() {
            return Err(ValidationError::invalid(
                "aircrafts",
                "at least one aircraft type is required",
            ));
        }
        if let Some(position) = self.aircrafts.iter().position(|ac| !ac.is_typed()) {
            return Err(ValidationError::invalid(
                "aircrafts",
                format!("aircraft #{} has no type", position + 1),
            ));
        }
        Ok(())
    }

    /// Fleet with ids assigned and unset counts normalised to one
    pub(crate) fn normalized_fleet(&self) -> Vec<Aircraft> {
        self.aircrafts
            .iter()
            .cloned()
            .map(|mut ac| {
                if ac.id.is_empty() {
                    ac.id = generate_id();
                }
                ac.count = ac.units();
                ac
            })
            .collect()
    }
}
