//! Vehicle domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::booking::DateRange;
use crate::domain::{DomainError, DomainResult};

/// Advisory listing flag. `Unavailable` vehicles reject new bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl FromStr for Availability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "Unavailable" => Ok(Self::Unavailable),
            other => Err(DomainError::Validation(format!(
                "unknown availability '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rentable car listing
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub model: String,
    /// Price per day in minor currency units
    pub daily_price: i64,
    pub location: String,
    pub availability: Availability,
    pub owner_email: String,
    pub owner_name: Option<String>,
    /// Licence plate as printed
    pub registration: String,
    pub description: String,
    pub features: Vec<String>,
    /// Hosted photo URLs; the first one is the cover
    pub image_urls: Vec<String>,
    /// Mean review rating, one decimal place, 0 when unreviewed
    pub rating: f64,
    pub review_count: i64,
    /// Lifetime booking counter
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        model: impl Into<String>,
        daily_price: i64,
        location: impl Into<String>,
        owner_email: impl Into<String>,
        owner_name: Option<String>,
    ) -> DomainResult<Self> {
        validate_price(daily_price)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            model: model.into(),
            daily_price,
            location: location.into(),
            availability: Availability::Available,
            owner_email: owner_email.into(),
            owner_name,
            registration: String::new(),
            description: String::new(),
            features: Vec::new(),
            image_urls: Vec::new(),
            rating: 0.0,
            review_count: 0,
            booking_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach the descriptive part of the listing
    pub fn with_details(mut self, details: VehicleDetails) -> DomainResult<Self> {
        details.validate()?;
        self.registration = details.registration;
        self.description = details.description;
        self.features = details.features;
        self.image_urls = details.image_urls;
        Ok(self)
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Price of renting this vehicle for `period`
    pub fn quote(&self, period: &DateRange) -> DomainResult<i64> {
        period
            .days()
            .checked_mul(self.daily_price)
            .ok_or_else(|| DomainError::Validation("total price overflows".into()))
    }

    /// Apply listing changes. Counters are never part of a patch.
    pub fn apply(&mut self, patch: VehiclePatch) -> DomainResult<()> {
        if let Some(price) = patch.daily_price {
            validate_price(price)?;
            self.daily_price = price;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(availability) = patch.availability {
            self.availability = availability;
        }
        if let Some(registration) = patch.registration {
            validate_registration(&registration)?;
            self.registration = registration;
        }
        if let Some(description) = patch.description {
            validate_description(&description)?;
            self.description = description;
        }
        if let Some(features) = patch.features {
            self.features = features;
        }
        if let Some(image_urls) = patch.image_urls {
            validate_image_urls(&image_urls)?;
            self.image_urls = image_urls;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Descriptive listing fields supplied when a vehicle is listed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleDetails {
    pub registration: String,
    pub description: String,
    pub features: Vec<String>,
    pub image_urls: Vec<String>,
}

impl VehicleDetails {
    pub fn validate(&self) -> DomainResult<()> {
        validate_registration(&self.registration)?;
        validate_description(&self.description)?;
        validate_image_urls(&self.image_urls)
    }
}

/// Owner-editable listing fields
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub model: Option<String>,
    pub daily_price: Option<i64>,
    pub location: Option<String>,
    pub availability: Option<Availability>,
    pub registration: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
}

const DESCRIPTION_MIN: usize = 10;
const DESCRIPTION_MAX: usize = 1000;

fn validate_price(price: i64) -> DomainResult<()> {
    if price <= 0 {
        return Err(DomainError::Validation(format!(
            "daily price must be positive, got {}",
            price
        )));
    }
    Ok(())
}

fn validate_registration(registration: &str) -> DomainResult<()> {
    if registration.trim().is_empty() {
        return Err(DomainError::Validation("registration is required".into()));
    }
    Ok(())
}

fn validate_description(description: &str) -> DomainResult<()> {
    let len = description.chars().count();
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&len) {
        return Err(DomainError::Validation(format!(
            "description must be {}-{} characters, got {}",
            DESCRIPTION_MIN, DESCRIPTION_MAX, len
        )));
    }
    Ok(())
}

fn validate_image_urls(urls: &[String]) -> DomainResult<()> {
    if urls.is_empty() {
        return Err(DomainError::Validation("at least one image is required".into()));
    }
    if let Some(bad) = urls
        .iter()
        .find(|u| !(u.starts_with("https://") || u.starts_with("http://")))
    {
        return Err(DomainError::Validation(format!(
            "image '{}' is not an http(s) URL",
            bad
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sedan() -> Vehicle {
        Vehicle::new("Corolla", 5_000, "Dhaka", "owner@x.com", None).unwrap()
    }

    #[test]
    fn new_vehicle_has_zero_counters() {
        let v = sedan();
        assert!(v.is_available());
        assert_eq!(v.booking_count, 0);
        assert_eq!(v.review_count, 0);
        assert_eq!(v.rating, 0.0);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        assert!(Vehicle::new("X", 0, "Y", "o@x.com", None).is_err());
        assert!(Vehicle::new("X", -10, "Y", "o@x.com", None).is_err());
    }

    #[test]
    fn quote_is_days_times_price() {
        let v = sedan();
        let period = DateRange::new(
            "2025-06-01".parse().unwrap(),
            "2025-06-03".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(v.quote(&period).unwrap(), 10_000);
    }

    #[test]
    fn patch_keeps_counters() {
        let mut v = sedan();
        v.booking_count = 4;
        v.apply(VehiclePatch {
            daily_price: Some(7_500),
            availability: Some(Availability::Unavailable),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v.daily_price, 7_500);
        assert!(!v.is_available());
        assert_eq!(v.booking_count, 4);
    }

    fn details() -> VehicleDetails {
        VehicleDetails {
            registration: "DHAKA-GA-11-2233".into(),
            description: "Clean sedan, recently serviced".into(),
            features: vec!["AC".into(), "Bluetooth".into()],
            image_urls: vec!["https://img.example.com/corolla.jpg".into()],
        }
    }

    #[test]
    fn details_are_attached_after_validation() {
        let v = sedan().with_details(details()).unwrap();
        assert_eq!(v.registration, "DHAKA-GA-11-2233");
        assert_eq!(v.features.len(), 2);

        let missing_plate = VehicleDetails {
            registration: "  ".into(),
            ..details()
        };
        assert!(sedan().with_details(missing_plate).is_err());

        let short = VehicleDetails {
            description: "tiny".into(),
            ..details()
        };
        assert!(sedan().with_details(short).is_err());

        let no_images = VehicleDetails {
            image_urls: vec![],
            ..details()
        };
        assert!(sedan().with_details(no_images).is_err());

        let local_file = VehicleDetails {
            image_urls: vec!["file:///tmp/car.jpg".into()],
            ..details()
        };
        assert!(sedan().with_details(local_file).is_err());
    }

    #[test]
    fn patch_validates_listing_details() {
        let mut v = sedan().with_details(details()).unwrap();
        v.apply(VehiclePatch {
            features: Some(vec!["GPS".into()]),
            description: Some("Now with a roof rack".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v.features, vec!["GPS".to_string()]);

        let err = v
            .apply(VehiclePatch {
                image_urls: Some(vec![]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(v.image_urls.len(), 1);
    }

    #[test]
    fn patch_with_bad_price_fails() {
        let mut v = sedan();
        let err = v
            .apply(VehiclePatch {
                daily_price: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(v.daily_price, 5_000);
    }
}
