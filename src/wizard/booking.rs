//! Public "book a service" form

use chrono::NaiveDate;
use serde::Serialize;

use super::{cycle, filled, FieldSpec, WizardForm};

string_enum!(VehicleType {
    Car => "car",
    Motorcycle => "motorcycle",
});

impl VehicleType {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Motorcycle => "Motorcycle",
        }
    }
}

string_enum!(ServiceType {
    Maintenance => "maintenance",
    Engine => "engine",
    Safety => "safety",
    Tuning => "tuning",
});

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::Maintenance => "Routine Maintenance",
            ServiceType::Engine => "Engine Diagnostics",
            ServiceType::Safety => "Safety Inspection",
            ServiceType::Tuning => "Performance Tuning",
        }
    }
}

string_enum!(ServiceLocation {
    Workshop => "workshop",
    Home => "home",
});

impl ServiceLocation {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceLocation::Workshop => "Come to Workshop",
            ServiceLocation::Home => "Home Service",
        }
    }
}

string_enum!(WorkshopChoice {
    JakartaSouth => "jakarta-south",
    JakartaWest => "jakarta-west",
    Tangerang => "tangerang",
    Bekasi => "bekasi",
});

impl WorkshopChoice {
    pub fn label(&self) -> &'static str {
        match self {
            WorkshopChoice::JakartaSouth => "AutoService South Jakarta (Radio Dalam)",
            WorkshopChoice::JakartaWest => "AutoService West Jakarta (Puri Indah)",
            WorkshopChoice::Tangerang => "AutoService Tangerang (BSD City)",
            WorkshopChoice::Bekasi => "AutoService Bekasi (Summarecon)",
        }
    }
}

/// Date format accepted by the preferred-date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub vehicle_model: String,
    pub service_type: ServiceType,
    pub date: String,
    pub service_location: ServiceLocation,
    pub address: String,
    pub selected_workshop: Option<WorkshopChoice>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            vehicle_type: VehicleType::Car,
            vehicle_model: String::new(),
            service_type: ServiceType::Maintenance,
            date: String::new(),
            service_location: ServiceLocation::Workshop,
            address: String::new(),
            selected_workshop: None,
        }
    }
}

impl BookingForm {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Where the mechanic meets the vehicle
    pub fn location_label(&self) -> String {
        match self.service_location {
            ServiceLocation::Workshop => self
                .selected_workshop
                .map(|w| w.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            ServiceLocation::Home => self.address.trim().to_string(),
        }
    }
}

impl WizardForm for BookingForm {
    const STEPS: &'static [&'static str] = &[
        "Personal Details",
        "Vehicle",
        "Service",
        "Location",
    ];

    fn fields(&self, step: usize) -> Vec<FieldSpec> {
        match step {
            1 => vec![
                FieldSpec::text("name", "Full Name"),
                FieldSpec::text("phone", "Phone Number"),
            ],
            2 => vec![
                FieldSpec::choice("vehicleType", "Vehicle Type"),
                FieldSpec::text("vehicleModel", "Vehicle Model"),
            ],
            3 => vec![
                FieldSpec::choice("serviceType", "Service Type"),
                FieldSpec::text("date", "Preferred Date (YYYY-MM-DD)"),
            ],
            4 => {
                let mut fields = vec![FieldSpec::choice("serviceLocation", "Service Location")];
                match self.service_location {
                    ServiceLocation::Workshop => {
                        fields.push(FieldSpec::choice("selectedWorkshop", "Workshop"))
                    }
                    ServiceLocation::Home => fields.push(FieldSpec::text("address", "Address")),
                }
                fields
            }
            _ => Vec::new(),
        }
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => filled(&self.name) && filled(&self.phone),
            2 => filled(&self.vehicle_model),
            3 => self.parsed_date().is_some(),
            4 => match self.service_location {
                ServiceLocation::Workshop => self.selected_workshop.is_some(),
                ServiceLocation::Home => filled(&self.address),
            },
            _ => false,
        }
    }

    fn text_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "phone" => Some(&mut self.phone),
            "vehicleModel" => Some(&mut self.vehicle_model),
            "date" => Some(&mut self.date),
            "address" => Some(&mut self.address),
            _ => None,
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "phone" => Some(&self.phone),
            "vehicleModel" => Some(&self.vehicle_model),
            "date" => Some(&self.date),
            "address" => Some(&self.address),
            _ => None,
        }
    }

    fn choice_label(&self, key: &str) -> Option<String> {
        let label = match key {
            "vehicleType" => self.vehicle_type.label(),
            "serviceType" => self.service_type.label(),
            "serviceLocation" => self.service_location.label(),
            "selectedWorkshop" => self
                .selected_workshop
                .map(|w| w.label())
                .unwrap_or("Select a location"),
            _ => return None,
        };
        Some(label.to_string())
    }

    fn cycle_choice(&mut self, key: &str, forward: bool) {
        match key {
            "vehicleType" => {
                self.vehicle_type = cycle(VehicleType::ALL, self.vehicle_type, forward)
            }
            "serviceType" => {
                self.service_type = cycle(ServiceType::ALL, self.service_type, forward)
            }
            "serviceLocation" => {
                self.service_location = cycle(ServiceLocation::ALL, self.service_location, forward)
            }
            "selectedWorkshop" => {
                self.selected_workshop = Some(match self.selected_workshop {
                    Some(current) => cycle(WorkshopChoice::ALL, current, forward),
                    None if forward => WorkshopChoice::ALL[0],
                    None => WorkshopChoice::ALL[WorkshopChoice::ALL.len() - 1],
                })
            }
            _ => {}
        }
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.trim().to_string()),
            ("Phone", self.phone.trim().to_string()),
            (
                "Vehicle",
                format!("{} ({})", self.vehicle_model.trim(), self.vehicle_type.label()),
            ),
            ("Service", self.service_type.label().to_string()),
            (
                "Date",
                self.parsed_date()
                    .map(|d| d.format("%b %-d, %Y").to_string())
                    .unwrap_or_else(|| self.date.clone()),
            ),
            ("Location", self.location_label()),
        ]
    }
}
