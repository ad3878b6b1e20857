use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp_cell;
use crate::{
    format,
    listing::{contains, Listing},
    table::{CellValue, Column, TableRecord},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub rating: f64,
    pub total_jobs: u32,
    #[serde(default)]
    pub services: Vec<String>,
    pub is_active: bool,
    pub operating_hours: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Workshop {
    pub fn status_code(&self) -> &'static str {
        if self.is_active {
            "active"
        } else {
            "offline"
        }
    }
}

impl TableRecord for Workshop {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "city" => self.city.as_str().into(),
            "address" => self.address.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "rating" => self.rating.into(),
            "totalJobs" => self.total_jobs.into(),
            "status" => self.status_code().into(),
            "operatingHours" => self.operating_hours.as_str().into(),
            "createdAt" => timestamp_cell(&self.created_at),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Workshop {
    const KIND: &'static str = "Workshop";
    const TITLE: &'static str = "Workshop Management";

    fn page_size() -> usize {
        8
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Workshop").sortable().with_width(24),
            Column::new("city", "City").sortable().with_width(10),
            Column::new("services", "Services")
                .custom(|w: &Self| format!("{} services", w.services.len()))
                .with_width(11),
            Column::new("operatingHours", "Hours").with_width(14),
            Column::new("rating", "Rating")
                .custom(|w: &Self| format!("★ {:.1}", w.rating))
                .sortable()
                .with_width(7),
            Column::new("totalJobs", "Jobs").number().sortable().with_width(6),
            Column::new("status", "Status").badge().with_width(8),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.name, q)
            || contains(&self.city, q)
            || contains(&self.address, q)
            || self.services.iter().any(|s| contains(s, q))
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Name", self.name.clone()),
            ("Address", format!("{}, {}", self.address, self.city)),
            ("Phone", self.phone.clone()),
            ("Email", self.email.clone()),
            ("Hours", self.operating_hours.clone()),
            ("Rating", format!("{:.1}", self.rating)),
            ("Total Jobs", self.total_jobs.to_string()),
            ("Services", self.services.join(", ")),
            ("Status", crate::status::label(self.status_code())),
            ("Registered", format::format_date(&self.created_at)),
        ];
        if let Some(ref description) = self.description {
            lines.insert(1, ("About", description.clone()));
        }
        lines
    }

    fn empty_message() -> &'static str {
        "No workshops match your search"
    }
}

string_enum!(PriceType {
    Fixed => "fixed",
    Hourly => "hourly",
    Estimate => "estimate",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub base_price: u64,
    /// Minutes
    pub duration: u32,
    pub price_type: PriceType,
    pub is_active: bool,
    pub description: String,
}

impl Service {
    pub fn price_label(&self) -> String {
        let price = format::format_currency(self.base_price);
        match self.price_type {
            PriceType::Fixed => price,
            PriceType::Hourly => format!("{}/hr", price),
            PriceType::Estimate => format!("from {}", price),
        }
    }

    pub fn duration_label(&self) -> String {
        match (self.duration / 60, self.duration % 60) {
            (0, m) => format!("{}m", m),
            (h, 0) => format!("{}h", h),
            (h, m) => format!("{}h {}m", h, m),
        }
    }
}

impl TableRecord for Service {
    fn record_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "categoryId" => self.category_id.as_str().into(),
            "basePrice" => self.base_price.into(),
            "duration" => self.duration.into(),
            "priceType" => self.price_type.as_str().into(),
            "status" => if self.is_active { "active" } else { "offline" }.into(),
            _ => CellValue::Empty,
        }
    }
}

impl Listing for Service {
    const KIND: &'static str = "Service";
    const TITLE: &'static str = "Service Catalog";

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Service").sortable().with_width(22),
            Column::new("categoryId", "Category").with_width(9),
            Column::new("basePrice", "Price")
                .custom(Service::price_label)
                .sortable()
                .with_width(20),
            Column::new("duration", "Duration")
                .custom(Service::duration_label)
                .sortable()
                .with_width(8),
            Column::new("status", "Status").badge().with_width(8),
        ]
    }

    fn matches_search(&self, q: &str) -> bool {
        contains(&self.name, q) || contains(&self.description, q)
    }

    fn detail(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Service", self.name.clone()),
            ("Category", self.category_id.clone()),
            ("Price", self.price_label()),
            ("Duration", self.duration_label()),
            ("Active", if self.is_active { "Yes" } else { "No" }.to_string()),
            ("Description", self.description.clone()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl ServiceCategory {
    pub fn active_services(&self) -> usize {
        self.services.iter().filter(|s| s.is_active).count()
    }
}

/// Categories with their services narrowed to `query` (name or description);
/// categories left without services are dropped.
pub fn filter_catalog(categories: &[ServiceCategory], query: &str) -> Vec<ServiceCategory> {
    let q = query.trim().to_lowercase();
    categories
        .iter()
        .map(|cat| ServiceCategory {
            services: cat
                .services
                .iter()
                .filter(|s| q.is_empty() || s.matches_search(&q))
                .cloned()
                .collect(),
            ..cat.clone()
        })
        .filter(|cat| !cat.services.is_empty())
        .collect()
}
