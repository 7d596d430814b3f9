//! Report definitions for the admin dashboard entities
//!
//! Each preset mirrors the columns and statistics its dashboard tab shows.
//! Columns with weight zero only appear in the delimited export.

use crate::definition::ReportDefinition;
use crate::mapping::{FieldMapping, FieldSource};
use crate::summary::{Aggregate, Predicate, SummarySpec};
use crate::table::{ColumnSpec, SemanticType, TruncationPolicy};
use serde_json::json;

/// Names accepted by [`by_name`]
pub const PRESET_NAMES: &[&str] = &[
    "users",
    "properties",
    "property-images",
    "verifications",
    "wishlists",
];

/// Look up a preset by name; underscores and dashes are interchangeable
pub fn by_name(name: &str) -> Option<ReportDefinition> {
    match name.trim().to_lowercase().replace('_', "-").as_str() {
        "users" => Some(users()),
        "properties" => Some(properties()),
        "property-images" | "images" => Some(property_images()),
        "verifications" => Some(verifications()),
        "wishlists" => Some(wishlists()),
        _ => None,
    }
}

/// First and last name, otherwise the username
fn person_name(prefix: &str) -> FieldSource {
    FieldSource::FirstNonEmpty(vec![
        FieldSource::Join {
            parts: vec![
                FieldSource::path(format!("{prefix}first_name")),
                FieldSource::path(format!("{prefix}last_name")),
            ],
            separator: " ".to_string(),
        },
        FieldSource::path(format!("{prefix}username")),
    ])
}

fn truthy(field: &str) -> Predicate {
    Predicate::Truthy { field: field.to_string() }
}

fn equals(field: &str, value: &str) -> Predicate {
    Predicate::Equals {
        field: field.to_string(),
        value: json!(value),
    }
}

pub fn users() -> ReportDefinition {
    ReportDefinition::new("users-report", "Users Report")
        .with_entity_label("Users")
        .column(
            ColumnSpec::new("id", "ID", 0.5),
            FieldMapping::path("id", "id", SemanticType::Integer).required(),
        )
        .column(
            ColumnSpec::new("username", "Username", 1.4).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("username", "username", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("name", "Name", 1.8),
            FieldMapping::new("name", person_name(""), SemanticType::Text),
        )
        .column(
            ColumnSpec::new("email", "Email", 2.4).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("email", "email", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("role", "Role", 0.9),
            FieldMapping::path("role", "role", SemanticType::Enum)
                .with_label("buyer", "Buyer")
                .with_label("seller", "Seller")
                .with_label("admin", "Admin"),
        )
        .column(
            ColumnSpec::new("status", "Status", 0.9),
            FieldMapping::path("status", "is_active", SemanticType::Enum)
                .with_label("true", "Active")
                .with_label("false", "Inactive"),
        )
        .column(
            ColumnSpec::new("phone", "Phone", 0.0),
            FieldMapping::path("phone", "phone_number", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("joined", "Joined Date", 1.1),
            FieldMapping::path("joined", "date_joined", SemanticType::Date),
        )
        .summarize(SummarySpec::count("Total Users"))
        .summarize(SummarySpec::count_where("Active Users", truthy("is_active")))
        .summarize(SummarySpec::count_where("Buyers", equals("role", "buyer")))
        .summarize(SummarySpec::count_where("Sellers", equals("role", "seller")))
        .summarize(SummarySpec::count_where("Admins", equals("role", "admin")))
}

pub fn properties() -> ReportDefinition {
    ReportDefinition::new("properties-report", "Properties Report")
        .with_entity_label("Properties")
        .column(
            ColumnSpec::new("id", "ID", 0.5),
            FieldMapping::path("id", "id", SemanticType::Integer).required(),
        )
        .column(
            ColumnSpec::new("name", "Property", 2.4),
            FieldMapping::path("name", "name", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("city", "City", 1.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("city", "city", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("type", "Type", 1.0),
            FieldMapping::path("type", "property_type", SemanticType::Enum)
                .with_label("house", "House")
                .with_label("apartment", "Apartment")
                .with_label("villa", "Villa")
                .with_label("land", "Land")
                .with_label("commercial", "Commercial"),
        )
        .column(
            ColumnSpec::new("price", "Price", 1.3),
            FieldMapping::path("price", "price", SemanticType::Currency).required(),
        )
        .column(
            ColumnSpec::new("status", "Status", 0.9),
            FieldMapping::path("status", "is_available", SemanticType::Enum)
                .with_label("true", "Active")
                .with_label("false", "Inactive"),
        )
        .column(
            ColumnSpec::new("seller", "Seller", 1.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::new(
                "seller",
                FieldSource::FirstNonEmpty(vec![
                    FieldSource::path("seller.username"),
                    FieldSource::path("seller_name"),
                ]),
                SemanticType::Text,
            ),
        )
        .column(
            ColumnSpec::new("listed", "Listed", 1.1),
            FieldMapping::path("listed", "created_at", SemanticType::Date),
        )
        .summarize(SummarySpec::count("Total Properties"))
        .summarize(SummarySpec::count_where("Active Properties", truthy("is_available")))
        .summarize(SummarySpec::count_where(
            "Inactive Properties",
            Predicate::Falsy { field: "is_available".to_string() },
        ))
        .summarize(SummarySpec::count_where(
            "Recent Properties",
            Predicate::WithinDays { field: "created_at".to_string(), days: 30 },
        ))
        .summarize(
            SummarySpec::new("Average Price", Aggregate::Average { field: "price".to_string() })
                .as_currency(),
        )
}

pub fn property_images() -> ReportDefinition {
    ReportDefinition::new("property-images-report", "Property Images Report")
        .with_entity_label("Images")
        .column(
            ColumnSpec::new("id", "ID", 0.5),
            FieldMapping::path("id", "id", SemanticType::Integer).required(),
        )
        .column(
            ColumnSpec::new("property", "Property", 2.2),
            FieldMapping::path("property", "property.name", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("city", "City", 1.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("city", "property.city", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("seller", "Seller", 1.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("seller", "seller.username", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("primary", "Primary", 0.9),
            FieldMapping::path("primary", "is_primary", SemanticType::Enum)
                .with_label("true", "Primary")
                .with_label("false", "Secondary"),
        )
        .column(
            ColumnSpec::new("url", "Image URL", 0.0),
            FieldMapping::path("url", "image_url", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("uploaded", "Uploaded", 1.1),
            FieldMapping::path("uploaded", "uploaded_at", SemanticType::Date),
        )
        .summarize(SummarySpec::count("Total Images"))
        .summarize(SummarySpec::count_where("Primary Images", truthy("is_primary")))
        .summarize(SummarySpec::count_where(
            "Recent Uploads",
            Predicate::WithinDays { field: "uploaded_at".to_string(), days: 30 },
        ))
}

pub fn verifications() -> ReportDefinition {
    ReportDefinition::new("verifications-report", "Seller Verifications Report")
        .with_entity_label("Verifications")
        .column(
            ColumnSpec::new("id", "ID", 0.5),
            FieldMapping::path("id", "id", SemanticType::Integer).required(),
        )
        .column(
            ColumnSpec::new("seller", "Seller", 1.8),
            FieldMapping::new("seller", person_name("user."), SemanticType::Text),
        )
        .column(
            ColumnSpec::new("email", "Email", 2.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("email", "user.email", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("status", "Status", 1.0),
            FieldMapping::path("status", "status", SemanticType::Enum)
                .with_label("pending", "Pending")
                .with_label("approved", "Approved")
                .with_label("rejected", "Rejected"),
        )
        .column(
            ColumnSpec::new("submitted", "Submitted", 1.1),
            FieldMapping::path("submitted", "submitted_at", SemanticType::Date).required(),
        )
        .column(
            ColumnSpec::new("reviewed", "Reviewed", 1.1),
            FieldMapping::path("reviewed", "reviewed_at", SemanticType::Date)
                .with_placeholder("Not reviewed"),
        )
        .column(
            ColumnSpec::new("notes", "Admin Notes", 0.0),
            FieldMapping::path("notes", "admin_notes", SemanticType::Text).with_placeholder(""),
        )
        .summarize(SummarySpec::count("Total Verifications"))
        .summarize(SummarySpec::count_where("Pending", equals("status", "pending")))
        .summarize(SummarySpec::count_where("Approved", equals("status", "approved")))
        .summarize(SummarySpec::count_where("Rejected", equals("status", "rejected")))
}

pub fn wishlists() -> ReportDefinition {
    ReportDefinition::new("wishlists-report", "Wishlists Report")
        .with_entity_label("Wishlists")
        .column(
            ColumnSpec::new("user_id", "User ID", 0.6),
            FieldMapping::path("user_id", "user.id", SemanticType::Integer).required(),
        )
        .column(
            ColumnSpec::new("username", "Username", 1.5).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("username", "user.username", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("email", "Email", 2.2).with_truncation(TruncationPolicy::Ellipsis),
            FieldMapping::path("email", "user.email", SemanticType::Text),
        )
        .column(
            ColumnSpec::new("items", "Items", 0.7),
            FieldMapping::path("items", "total_items", SemanticType::Integer),
        )
        .column(
            ColumnSpec::new("latest", "Latest Property", 2.0),
            FieldMapping::path("latest", "wishlist_items.0.property.name", SemanticType::Text),
        )
        .summarize(SummarySpec::count("Users with Wishlists"))
        .summarize(SummarySpec::new(
            "Total Wishlist Items",
            Aggregate::Sum { field: "total_items".to_string() },
        ))
        .summarize(SummarySpec::new(
            "Average Items per User",
            Aggregate::Average { field: "total_items".to_string() },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{ProjectorOptions, RecordProjector};

    #[test]
    fn test_all_presets_validate() {
        for name in PRESET_NAMES {
            let def = by_name(name).unwrap_or_else(|| panic!("missing preset {name}"));
            def.validate().unwrap();
            assert_eq!(def.columns.len(), def.fields.len());
        }
    }

    #[test]
    fn test_by_name_normalizes() {
        assert_eq!(by_name("Property_Images").unwrap().name, "property-images-report");
        assert!(by_name("invoices").is_none());
    }

    #[test]
    fn test_verification_projection() {
        let def = verifications();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let record = serde_json::json!({
            "id": 7,
            "user": {"username": "sam", "first_name": "", "last_name": "", "email": "sam@example.com"},
            "status": "pending",
            "submitted_at": "2024-05-01T12:00:00Z",
            "reviewed_at": null,
            "admin_notes": ""
        });
        let row = projector.project_record(0, &record).unwrap();
        assert_eq!(
            row.display_texts(),
            vec!["7", "sam", "sam@example.com", "Pending", "2024-05-01", "Not reviewed", ""]
        );
    }

    #[test]
    fn test_users_summary() {
        let def = users();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let records = vec![
            serde_json::json!({"id": 1, "role": "buyer", "is_active": true}),
            serde_json::json!({"id": 2, "role": "seller", "is_active": false}),
            serde_json::json!({"id": 3, "role": "seller", "is_active": true}),
        ];
        let projection = projector.project(&records);
        assert_eq!(projection.summary.value("Total Users"), Some(3.0));
        assert_eq!(projection.summary.value("Active Users"), Some(2.0));
        assert_eq!(projection.summary.value("Sellers"), Some(2.0));
        assert_eq!(projection.summary.value("Admins"), Some(0.0));
    }
}
