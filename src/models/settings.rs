use serde::{Deserialize, Serialize};

/// Platform-wide operating parameters edited on the settings screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub surge_multiplier: f64,
    pub commission_percentage: u32,
    pub service_radius_km: u32,
    pub max_active_bookings_per_mechanic: u32,
    pub cancellation_fee_percentage: u32,
    pub auto_assign_enabled: bool,
    pub maintenance_mode: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            surge_multiplier: 1.0,
            commission_percentage: 15,
            service_radius_km: 15,
            max_active_bookings_per_mechanic: 3,
            cancellation_fee_percentage: 10,
            auto_assign_enabled: true,
            maintenance_mode: false,
        }
    }
}

/// One editable row of the settings form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    SurgeMultiplier,
    CommissionPercentage,
    CancellationFeePercentage,
    ServiceRadiusKm,
    MaxActiveBookings,
    AutoAssign,
    MaintenanceMode,
}

impl SettingField {
    pub const ALL: [SettingField; 7] = [
        SettingField::SurgeMultiplier,
        SettingField::CommissionPercentage,
        SettingField::CancellationFeePercentage,
        SettingField::ServiceRadiusKm,
        SettingField::MaxActiveBookings,
        SettingField::AutoAssign,
        SettingField::MaintenanceMode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingField::SurgeMultiplier => "Surge Multiplier",
            SettingField::CommissionPercentage => "Commission Percentage",
            SettingField::CancellationFeePercentage => "Cancellation Fee",
            SettingField::ServiceRadiusKm => "Service Radius (km)",
            SettingField::MaxActiveBookings => "Max Active Bookings per Mechanic",
            SettingField::AutoAssign => "Auto-Assign Mechanics",
            SettingField::MaintenanceMode => "Maintenance Mode",
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self, SettingField::AutoAssign | SettingField::MaintenanceMode)
    }
}

impl SystemSettings {
    pub const SURGE_MIN: f64 = 1.0;
    pub const SURGE_MAX: f64 = 3.0;
    pub const SURGE_STEP: f64 = 0.1;
    pub const COMMISSION_RANGE: (u32, u32) = (5, 30);
    pub const CANCELLATION_RANGE: (u32, u32) = (0, 25);

    /// Steps a numeric field by `steps` increments, clamped to its bounds.
    /// Toggle fields flip regardless of the step count.
    pub fn adjust(&mut self, field: SettingField, steps: i32) {
        match field {
            SettingField::SurgeMultiplier => {
                let value = self.surge_multiplier + steps as f64 * Self::SURGE_STEP;
                // Keep one decimal so repeated stepping does not drift
                let value = (value * 10.0).round() / 10.0;
                self.surge_multiplier = value.clamp(Self::SURGE_MIN, Self::SURGE_MAX);
            }
            SettingField::CommissionPercentage => {
                let (lo, hi) = Self::COMMISSION_RANGE;
                self.commission_percentage = step_u32(self.commission_percentage, steps, lo, hi);
            }
            SettingField::CancellationFeePercentage => {
                let (lo, hi) = Self::CANCELLATION_RANGE;
                self.cancellation_fee_percentage =
                    step_u32(self.cancellation_fee_percentage, steps, lo, hi);
            }
            SettingField::ServiceRadiusKm => {
                self.service_radius_km = step_u32(self.service_radius_km, steps, 0, u32::MAX);
            }
            SettingField::MaxActiveBookings => {
                self.max_active_bookings_per_mechanic =
                    step_u32(self.max_active_bookings_per_mechanic, steps, 1, u32::MAX);
            }
            SettingField::AutoAssign => self.auto_assign_enabled = !self.auto_assign_enabled,
            SettingField::MaintenanceMode => self.maintenance_mode = !self.maintenance_mode,
        }
    }

    /// Sets a numeric field from typed text. Unparsable input falls back to
    /// the field minimum, as an emptied number box would.
    pub fn set_from_text(&mut self, field: SettingField, text: &str) {
        let text = text.trim();
        match field {
            SettingField::SurgeMultiplier => {
                let value = text.parse::<f64>().unwrap_or(Self::SURGE_MIN);
                self.surge_multiplier = value.clamp(Self::SURGE_MIN, Self::SURGE_MAX);
            }
            SettingField::CommissionPercentage => {
                let (lo, hi) = Self::COMMISSION_RANGE;
                self.commission_percentage = text.parse::<u32>().unwrap_or(lo).clamp(lo, hi);
            }
            SettingField::CancellationFeePercentage => {
                let (lo, hi) = Self::CANCELLATION_RANGE;
                self.cancellation_fee_percentage = text.parse::<u32>().unwrap_or(lo).clamp(lo, hi);
            }
            SettingField::ServiceRadiusKm => {
                self.service_radius_km = text.parse::<u32>().unwrap_or(0);
            }
            SettingField::MaxActiveBookings => {
                self.max_active_bookings_per_mechanic = text.parse::<u32>().unwrap_or(1).max(1);
            }
            SettingField::AutoAssign | SettingField::MaintenanceMode => {}
        }
    }

    pub fn display_value(&self, field: SettingField) -> String {
        match field {
            SettingField::SurgeMultiplier => format!("{:.1}x", self.surge_multiplier),
            SettingField::CommissionPercentage => format!("{}%", self.commission_percentage),
            SettingField::CancellationFeePercentage => {
                format!("{}%", self.cancellation_fee_percentage)
            }
            SettingField::ServiceRadiusKm => format!("{} km", self.service_radius_km),
            SettingField::MaxActiveBookings => self.max_active_bookings_per_mechanic.to_string(),
            SettingField::AutoAssign => on_off(self.auto_assign_enabled),
            SettingField::MaintenanceMode => on_off(self.maintenance_mode),
        }
    }
}

fn step_u32(value: u32, steps: i32, lo: u32, hi: u32) -> u32 {
    let next = value as i64 + steps as i64;
    next.clamp(lo as i64, hi as i64) as u32
}

fn on_off(enabled: bool) -> String {
    if enabled { "Enabled" } else { "Disabled" }.to_string()
}

/// Static platform facts shown beside the settings form
pub const SYSTEM_INFO: &[(&str, &str)] = &[
    ("Platform Version", "1.0.0"),
    ("API Version", "v1"),
    ("Environment", "Development"),
    ("Database", "JSON fixtures"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surge_steps_and_clamps() {
        let mut s = SystemSettings::default();
        s.adjust(SettingField::SurgeMultiplier, 3);
        assert_eq!(s.surge_multiplier, 1.3);
        s.adjust(SettingField::SurgeMultiplier, 100);
        assert_eq!(s.surge_multiplier, 3.0);
        s.adjust(SettingField::SurgeMultiplier, -100);
        assert_eq!(s.surge_multiplier, 1.0);
    }

    #[test]
    fn test_percentage_bounds() {
        let mut s = SystemSettings::default();
        s.adjust(SettingField::CommissionPercentage, -50);
        assert_eq!(s.commission_percentage, 5);
        s.adjust(SettingField::CommissionPercentage, 50);
        assert_eq!(s.commission_percentage, 30);
        s.adjust(SettingField::CancellationFeePercentage, -50);
        assert_eq!(s.cancellation_fee_percentage, 0);
        s.adjust(SettingField::CancellationFeePercentage, 50);
        assert_eq!(s.cancellation_fee_percentage, 25);
    }

    #[test]
    fn test_max_active_bookings_never_below_one() {
        let mut s = SystemSettings::default();
        s.adjust(SettingField::MaxActiveBookings, -10);
        assert_eq!(s.max_active_bookings_per_mechanic, 1);
        s.set_from_text(SettingField::MaxActiveBookings, "abc");
        assert_eq!(s.max_active_bookings_per_mechanic, 1);
        s.set_from_text(SettingField::MaxActiveBookings, "7");
        assert_eq!(s.max_active_bookings_per_mechanic, 7);
    }

    #[test]
    fn test_toggles_flip() {
        let mut s = SystemSettings::default();
        assert!(s.auto_assign_enabled);
        s.adjust(SettingField::AutoAssign, 1);
        assert!(!s.auto_assign_enabled);
        s.adjust(SettingField::MaintenanceMode, -1);
        assert!(s.maintenance_mode);
        assert_eq!(s.display_value(SettingField::MaintenanceMode), "Enabled");
    }

    #[test]
    fn test_set_from_text_clamps() {
        let mut s = SystemSettings::default();
        s.set_from_text(SettingField::SurgeMultiplier, "5");
        assert_eq!(s.surge_multiplier, 3.0);
        s.set_from_text(SettingField::CommissionPercentage, "2");
        assert_eq!(s.commission_percentage, 5);
        s.set_from_text(SettingField::ServiceRadiusKm, " 25 ");
        assert_eq!(s.service_radius_km, 25);
    }
}
