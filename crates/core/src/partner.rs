use serde::Serialize;
use thiserror::Error;

/// Longest pattern storable in the index, mirroring the backing column width.
pub const MAX_DATA_CHARS: usize = 255;

#[derive(Debug, Error)]
pub enum PartnerDataError {
    #[error("partner id must be positive, got {0}")]
    InvalidPartnerId(i64),
    #[error("partner detail id must not be negative, got {0}")]
    InvalidDetailId(i64),
    #[error("keyword data is empty after trimming")]
    EmptyData,
    #[error("keyword data is {0} characters, maximum is {MAX_DATA_CHARS}")]
    DataTooLong(usize),
    #[error("occurrence count must not be negative, got {0}")]
    InvalidOccurrenceCount(i64),
}

/// One row of the partner keyword index: a partner identity, the indexed
/// keyword, and how often that pairing has been observed.
///
/// `partner_type` is an opaque discriminator owned by the host application
/// (customer, supplier, bank account, ...); the engine never interprets it.
/// A `partner_detail_id` of 0 means the row is not tied to a detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerData {
    partner_id: i64,
    partner_type: i32,
    partner_detail_id: i64,
    data: String,
    occurrence_count: i64,
}

impl PartnerData {
    /// Builds a row with the starting occurrence count of 1.
    pub fn new(
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        data: &str,
    ) -> Result<Self, PartnerDataError> {
        Self::with_count(partner_id, partner_type, partner_detail_id, data, 1)
    }

    pub fn with_count(
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        data: &str,
        occurrence_count: i64,
    ) -> Result<Self, PartnerDataError> {
        if partner_id <= 0 {
            return Err(PartnerDataError::InvalidPartnerId(partner_id));
        }
        if partner_detail_id < 0 {
            return Err(PartnerDataError::InvalidDetailId(partner_detail_id));
        }
        let data = data.trim();
        if data.is_empty() {
            return Err(PartnerDataError::EmptyData);
        }
        let chars = data.chars().count();
        if chars > MAX_DATA_CHARS {
            return Err(PartnerDataError::DataTooLong(chars));
        }
        if occurrence_count < 0 {
            return Err(PartnerDataError::InvalidOccurrenceCount(occurrence_count));
        }
        Ok(PartnerData {
            partner_id,
            partner_type,
            partner_detail_id,
            data: data.to_string(),
            occurrence_count,
        })
    }

    pub fn partner_id(&self) -> i64 {
        self.partner_id
    }

    pub fn partner_type(&self) -> i32 {
        self.partner_type
    }

    pub fn partner_detail_id(&self) -> i64 {
        self.partner_detail_id
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn occurrence_count(&self) -> i64 {
        self.occurrence_count
    }

    /// Returns a copy with the occurrence count increased by `n`.
    pub fn with_incremented_count(&self, n: u32) -> Self {
        PartnerData {
            occurrence_count: self.occurrence_count + i64::from(n),
            ..self.clone()
        }
    }

    /// True when both rows name the same `(partner, type, detail, data)`
    /// identity. `data` compares ASCII case-insensitively, matching the
    /// collation of the storage backends.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.partner_id == other.partner_id
            && self.partner_type == other.partner_type
            && self.partner_detail_id == other.partner_detail_id
            && self.data.eq_ignore_ascii_case(&other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(data: &str) -> PartnerData {
        PartnerData::new(1, 1, 0, data).unwrap()
    }

    #[test]
    fn new_defaults_occurrence_count_to_one() {
        let row = row("walmart");
        assert_eq!(row.occurrence_count(), 1);
        assert_eq!(row.data(), "walmart");
    }

    #[test]
    fn data_is_trimmed() {
        assert_eq!(row("  walmart  ").data(), "walmart");
    }

    #[test]
    fn rejects_non_positive_partner_id() {
        assert!(matches!(
            PartnerData::new(0, 1, 0, "walmart"),
            Err(PartnerDataError::InvalidPartnerId(0))
        ));
        assert!(matches!(
            PartnerData::new(-3, 1, 0, "walmart"),
            Err(PartnerDataError::InvalidPartnerId(-3))
        ));
    }

    #[test]
    fn rejects_negative_detail_id() {
        assert!(matches!(
            PartnerData::new(1, 1, -1, "walmart"),
            Err(PartnerDataError::InvalidDetailId(-1))
        ));
    }

    #[test]
    fn rejects_blank_data() {
        assert!(matches!(
            PartnerData::new(1, 1, 0, "   "),
            Err(PartnerDataError::EmptyData)
        ));
    }

    #[test]
    fn data_length_boundary() {
        assert!(PartnerData::new(1, 1, 0, &"x".repeat(255)).is_ok());
        assert!(matches!(
            PartnerData::new(1, 1, 0, &"x".repeat(256)),
            Err(PartnerDataError::DataTooLong(256))
        ));
    }

    #[test]
    fn rejects_negative_occurrence_count() {
        assert!(matches!(
            PartnerData::with_count(1, 1, 0, "walmart", -1),
            Err(PartnerDataError::InvalidOccurrenceCount(-1))
        ));
    }

    #[test]
    fn zero_occurrence_count_is_allowed() {
        let row = PartnerData::with_count(1, 1, 0, "walmart", 0).unwrap();
        assert_eq!(row.occurrence_count(), 0);
    }

    #[test]
    fn increment_returns_updated_copy() {
        let row = row("walmart");
        let bumped = row.with_incremented_count(5);
        assert_eq!(bumped.occurrence_count(), 6);
        assert_eq!(row.occurrence_count(), 1);
        assert!(row.same_identity(&bumped));
    }

    #[test]
    fn identity_ignores_data_case() {
        let a = row("Walmart");
        let b = row("WALMART");
        assert!(a.same_identity(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn identity_distinguishes_detail_ids() {
        let a = PartnerData::new(1, 1, 0, "walmart").unwrap();
        let b = PartnerData::new(1, 1, 7, "walmart").unwrap();
        assert!(!a.same_identity(&b));
    }
}
