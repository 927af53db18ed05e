//! The fixed list of documents a barangay issues.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    #[serde(rename = "type")]
    pub name: &'static str,
    pub description: &'static str,
    pub fee: f64,
    pub processing_time: &'static str,
    pub requirements: &'static [&'static str],
}

pub static DOCUMENT_TYPES: [DocumentType; 5] = [
    DocumentType {
        name: "Barangay Clearance",
        description: "Certificate for legal and employment purposes",
        fee: 50.00,
        processing_time: "3-5 business days",
        requirements: &["Valid ID", "Proof of Residency"],
    },
    DocumentType {
        name: "Certificate of Indigency",
        description: "For financial assistance and scholarship applications",
        fee: 0.00,
        processing_time: "2-3 business days",
        requirements: &["Valid ID", "Proof of Income"],
    },
    DocumentType {
        name: "Business Permit",
        description: "License to operate business within the barangay",
        fee: 200.00,
        processing_time: "7-10 business days",
        requirements: &["Business Registration", "Valid ID", "Location Map"],
    },
    DocumentType {
        name: "Residency Certificate",
        description: "Proof of residence in the barangay",
        fee: 30.00,
        processing_time: "1-2 business days",
        requirements: &["Valid ID", "Utility Bill"],
    },
    DocumentType {
        name: "Certificate of Good Moral",
        description: "Character certificate for employment or school",
        fee: 25.00,
        processing_time: "2-3 business days",
        requirements: &["Valid ID", "Proof of Residency"],
    },
];

pub fn document_types() -> &'static [DocumentType] {
    &DOCUMENT_TYPES
}

/// Looks up a document type by its exact name.
pub fn find(name: &str) -> Option<&'static DocumentType> {
    DOCUMENT_TYPES.iter().find(|doc| doc.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fees() {
        let fees: Vec<_> = document_types().iter().map(|d| (d.name, d.fee)).collect();
        assert_eq!(
            fees,
            [
                ("Barangay Clearance", 50.0),
                ("Certificate of Indigency", 0.0),
                ("Business Permit", 200.0),
                ("Residency Certificate", 30.0),
                ("Certificate of Good Moral", 25.0),
            ]
        );
    }

    #[test]
    fn test_find_is_exact() {
        assert_eq!(find("Business Permit").map(|d| d.fee), Some(200.0));
        assert!(find("business permit").is_none());
        assert!(find("Cedula").is_none());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(&DOCUMENT_TYPES[2]).unwrap();
        assert_eq!(json["type"], "Business Permit");
        assert_eq!(json["processingTime"], "7-10 business days");
        assert_eq!(json["requirements"][2], "Location Map");
    }
}
