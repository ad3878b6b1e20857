//! Add-workshop and edit-workshop forms

use chrono::{DateTime, Utc};

use super::{filled, FieldSpec, WizardForm};
use crate::models::Workshop;

string_enum!(City {
    Jakarta => "jakarta",
    Bandung => "bandung",
    Surabaya => "surabaya",
});

impl City {
    pub fn label(&self) -> &'static str {
        match self {
            City::Jakarta => "Jakarta",
            City::Bandung => "Bandung",
            City::Surabaya => "Surabaya",
        }
    }
}

pub const WORKSHOP_SERVICE_OPTIONS: [&str; 6] = [
    "Oil Change",
    "Brake Service",
    "Engine Tune-up",
    "AC Service",
    "Tire Service",
    "General Inspection",
];

pub const DEFAULT_OPERATING_HOURS: &str = "09:00 - 17:00";

#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopForm {
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub city: Option<City>,
    pub address: String,
    pub services: Vec<String>,
    pub operating_hours: String,
}

impl Default for WorkshopForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            email: String::new(),
            phone: String::new(),
            city: None,
            address: String::new(),
            services: vec!["Oil Change".to_string()],
            operating_hours: DEFAULT_OPERATING_HOURS.to_string(),
        }
    }
}

impl WorkshopForm {
    /// Form prefilled from an existing workshop for editing
    pub fn from_workshop(workshop: &Workshop) -> Self {
        Self {
            name: workshop.name.clone(),
            description: workshop.description.clone().unwrap_or_default(),
            email: workshop.email.clone(),
            phone: workshop.phone.clone(),
            city: City::parse(&workshop.city),
            address: workshop.address.clone(),
            services: workshop.services.clone(),
            operating_hours: workshop.operating_hours.clone(),
        }
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services.iter().any(|s| s.eq_ignore_ascii_case(service))
    }

    /// Adds or removes `service`
    pub fn toggle_service(&mut self, service: &str) {
        if self.has_service(service) {
            self.services.retain(|s| !s.eq_ignore_ascii_case(service));
        } else {
            self.services.push(service.to_string());
        }
    }

    /// New workshop record built from the form
    pub fn into_workshop(self, id: String, created_at: DateTime<Utc>) -> Workshop {
        let mut workshop = Workshop {
            id,
            name: String::new(),
            address: String::new(),
            city: String::new(),
            phone: String::new(),
            email: String::new(),
            rating: 0.0,
            total_jobs: 0,
            services: Vec::new(),
            is_active: true,
            operating_hours: String::new(),
            created_at,
            description: None,
        };
        self.apply_to(&mut workshop);
        workshop
    }

    /// Writes the editable fields onto `workshop`, keeping its id, rating,
    /// job count and status. A workshop outside the selectable cities keeps
    /// its city unless another one is picked.
    pub fn apply_to(&self, workshop: &mut Workshop) {
        workshop.name = self.name.trim().to_string();
        workshop.email = self.email.trim().to_string();
        workshop.phone = self.phone.trim().to_string();
        workshop.address = self.address.trim().to_string();
        if let Some(city) = self.city {
            workshop.city = city.label().to_string();
        }
        workshop.services = self.services.clone();
        workshop.operating_hours = self.operating_hours.trim().to_string();
        let description = self.description.trim();
        workshop.description = (!description.is_empty()).then(|| description.to_string());
    }
}

impl WizardForm for WorkshopForm {
    const STEPS: &'static [&'static str] =
        &["Basic Info", "Location", "Services", "Hours & Contact"];

    fn fields(&self, step: usize) -> Vec<FieldSpec> {
        match step {
            1 => vec![
                FieldSpec::text("name", "Workshop Name"),
                FieldSpec::text("description", "Description").optional(),
                FieldSpec::text("email", "Email Address"),
                FieldSpec::text("phone", "Phone Number"),
            ],
            2 => vec![
                FieldSpec::choice("city", "City"),
                FieldSpec::text("address", "Full Address"),
            ],
            3 => vec![FieldSpec::toggles("services", "Available Services")],
            4 => vec![FieldSpec::text("operatingHours", "Working Hours")],
            _ => Vec::new(),
        }
    }

    fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => filled(&self.name) && filled(&self.email) && filled(&self.phone),
            2 => self.city.is_some() && filled(&self.address),
            3 => !self.services.is_empty(),
            4 => filled(&self.operating_hours),
            _ => false,
        }
    }

    fn text_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "description" => Some(&mut self.description),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "address" => Some(&mut self.address),
            "operatingHours" => Some(&mut self.operating_hours),
            _ => None,
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "description" => Some(&self.description),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            "address" => Some(&self.address),
            "operatingHours" => Some(&self.operating_hours),
            _ => None,
        }
    }

    fn choice_label(&self, key: &str) -> Option<String> {
        match key {
            "city" => Some(
                self.city
                    .map(|c| c.label())
                    .unwrap_or("Select City")
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn cycle_choice(&mut self, key: &str, forward: bool) {
        if key == "city" {
            self.city = Some(match self.city {
                Some(current) => super::cycle(City::ALL, current, forward),
                None if forward => City::ALL[0],
                None => City::ALL[City::ALL.len() - 1],
            });
        }
    }

    fn toggle_options(&self, key: &str) -> Vec<(&'static str, bool)> {
        match key {
            "services" => WORKSHOP_SERVICE_OPTIONS
                .iter()
                .map(|&s| (s, self.has_service(s)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn toggle(&mut self, key: &str, index: usize) {
        if key == "services" {
            if let Some(service) = WORKSHOP_SERVICE_OPTIONS.get(index) {
                self.toggle_service(service);
            }
        }
    }

    fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Workshop", self.name.trim().to_string()),
            ("Email", self.email.trim().to_string()),
            ("Phone", self.phone.trim().to_string()),
            (
                "City",
                self.city.map(|c| c.label()).unwrap_or("-").to_string(),
            ),
            ("Address", self.address.trim().to_string()),
            ("Services", self.services.join(", ")),
            ("Hours", self.operating_hours.trim().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{Transition, Wizard};
    use chrono::TimeZone;

    fn basic_info(form: &mut WorkshopForm) {
        form.name = "Bengkel Maju".to_string();
        form.email = "maju@bengkel.id".to_string();
        form.phone = "021-555".to_string();
    }

    #[test]
    fn test_defaults() {
        let form = WorkshopForm::default();
        assert_eq!(form.services, vec!["Oil Change".to_string()]);
        assert_eq!(form.operating_hours, "09:00 - 17:00");
        assert!(form.step_complete(3));
        assert!(form.step_complete(4));
    }

    #[test]
    fn test_description_is_optional() {
        let mut form = WorkshopForm::default();
        basic_info(&mut form);
        assert!(form.step_complete(1));
        assert!(!form.fields(1)[1].required);
    }

    #[test]
    fn test_location_needs_city_and_address() {
        let mut form = WorkshopForm::default();
        form.address = "Jl. Merdeka 10".to_string();
        assert!(!form.step_complete(2));
        form.cycle_choice("city", true);
        assert_eq!(form.city, Some(City::Jakarta));
        assert!(form.step_complete(2));
    }

    #[test]
    fn test_services_require_at_least_one() {
        let mut wizard = Wizard::new(WorkshopForm::default());
        {
            let form = wizard.form_mut().unwrap();
            basic_info(form);
            form.city = Some(City::Bandung);
            form.address = "Jl. Dago 1".to_string();
        }
        wizard.next();
        wizard.next();
        assert_eq!(wizard.current_step(), 3);

        wizard.form_mut().unwrap().toggle("services", 0);
        assert!(wizard.form().services.is_empty());
        assert_eq!(wizard.next(), Transition::Blocked);

        wizard.form_mut().unwrap().toggle("services", 3);
        assert_eq!(wizard.form().services, vec!["AC Service".to_string()]);
        assert_eq!(wizard.next(), Transition::Moved(4));
    }

    #[test]
    fn test_into_workshop() {
        let mut form = WorkshopForm::default();
        basic_info(&mut form);
        form.city = Some(City::Surabaya);
        form.address = " Jl. Pemuda 3 ".to_string();
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let workshop = form.into_workshop("ws-new".to_string(), created);
        assert_eq!(workshop.city, "Surabaya");
        assert_eq!(workshop.address, "Jl. Pemuda 3");
        assert_eq!(workshop.total_jobs, 0);
        assert!(workshop.is_active);
        assert_eq!(workshop.description, None);
    }

    #[test]
    fn test_edit_keeps_unlisted_city() {
        let created = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut workshop = WorkshopForm {
            name: "AutoService Tangerang".to_string(),
            ..Default::default()
        }
        .into_workshop("ws-3".to_string(), created);
        workshop.city = "Tangerang".to_string();

        let mut form = WorkshopForm::from_workshop(&workshop);
        assert_eq!(form.city, None);
        form.operating_hours = "08:00 - 20:00".to_string();
        form.apply_to(&mut workshop);
        assert_eq!(workshop.city, "Tangerang");
        assert_eq!(workshop.operating_hours, "08:00 - 20:00");
        assert_eq!(workshop.id, "ws-3");
    }
}
