use chrono::{Datelike, Utc};
use rand::Rng;

/// Builds a tracking number of the form `{PREFIX}-{year}-{nnnn}`.
///
/// The prefix is the first two characters of the document type, uppercased.
/// Numbers are random and may collide; callers reserve them in the store and
/// retry on conflict.
pub fn generate_with<R: Rng + ?Sized>(document_type: &str, year: i32, rng: &mut R) -> String {
    let prefix: String = document_type.chars().take(2).collect::<String>().to_uppercase();
    let serial: u16 = rng.random_range(0..10_000);
    format!("{prefix}-{year}-{serial:04}")
}

/// Tracking number for a request filed now.
pub fn generate(document_type: &str) -> String {
    generate_with(document_type, Utc::now().year(), &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let number = generate_with("Barangay Clearance", 2024, &mut rng);
            let (prefix, rest) = number.split_once('-').unwrap();
            let (year, serial) = rest.split_once('-').unwrap();

            assert_eq!(prefix, "BA");
            assert_eq!(year, "2024");
            assert_eq!(serial.len(), 4);
            assert!(serial.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_prefix_of_each_type() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_with("Certificate of Indigency", 2025, &mut rng).starts_with("CE-2025-"));
        assert!(generate_with("Residency Certificate", 2025, &mut rng).starts_with("RE-2025-"));
        assert!(generate_with("Business Permit", 2025, &mut rng).starts_with("BU-2025-"));
    }

    #[test]
    fn test_same_seed_same_number() {
        let a = generate_with("Business Permit", 2024, &mut StdRng::seed_from_u64(42));
        let b = generate_with("Business Permit", 2024, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_uses_current_year() {
        let number = generate("Barangay Clearance");
        assert!(number.starts_with(&format!("BA-{}-", Utc::now().year())));
    }
}
