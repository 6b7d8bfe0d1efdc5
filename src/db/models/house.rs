//! House documents and the booking patch bodies.
//!
//! Field names mix snake and camel case; that is the shape the frontend
//! already speaks, preserved here with serde renames.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub room_size: i64,
    pub availability_date: String,
    pub image: String,
    pub rent_per_month: i64,
    pub description: String,
    pub phone_number: String,
    #[serde(rename = "isBooked", default)]
    pub is_booked: bool,
    #[serde(rename = "userEmail", default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// Full-replace body for `PATCH /houses/:id`. Everything but the id and the
/// booking owner is overwritten in one `$set`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseUpdate {
    pub name: String,
    pub address: String,
    pub city: String,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub room_size: i64,
    pub availability_date: String,
    pub image: String,
    pub rent_per_month: i64,
    pub description: String,
    pub phone_number: String,
    #[serde(rename = "isBooked", default)]
    pub is_booked: bool,
}

/// Body for `PATCH /bookHouses/:id`: flips the booking flag and records who
/// booked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookHouseUpdate {
    #[serde(rename = "isBooked")]
    pub is_booked: bool,
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

/// Body for `PATCH /bookedHouses/:id`: flips only the booking flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedFlagUpdate {
    #[serde(rename = "isBooked")]
    pub is_booked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_round_trips_wire_names() {
        let json = serde_json::json!({
            "name": "Green View Apartment",
            "address": "12 Lake Road",
            "city": "Dhaka",
            "bedrooms": 3,
            "bathrooms": 2,
            "room_size": 1200,
            "availability_date": "2026-09-01",
            "image": "https://example.com/house.jpg",
            "rent_per_month": 800,
            "description": "South-facing, near the lake",
            "phone_number": "01700000000",
            "isBooked": false,
        });

        let house: House = serde_json::from_value(json).unwrap();
        assert_eq!(house.city, "Dhaka");
        assert_eq!(house.rent_per_month, 800);
        assert!(!house.is_booked);
        assert!(house.user_email.is_none());

        let back = serde_json::to_value(&house).unwrap();
        assert_eq!(back["isBooked"], false);
        assert_eq!(back["room_size"], 1200);
        // absent fields stay absent
        assert!(back.get("_id").is_none());
        assert!(back.get("userEmail").is_none());
    }

    #[test]
    fn booking_flag_defaults_to_false() {
        let json = serde_json::json!({
            "name": "n", "address": "a", "city": "c",
            "bedrooms": 1, "bathrooms": 1, "room_size": 400,
            "availability_date": "2026-09-01", "image": "i",
            "rent_per_month": 500, "description": "d", "phone_number": "p",
        });
        let house: House = serde_json::from_value(json).unwrap();
        assert!(!house.is_booked);
    }
}
