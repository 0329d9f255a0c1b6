/// Opaque document identifier assigned by the store on insert.
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh document id (32 lowercase hex characters).
pub fn new_doc_id() -> DocId {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ids_are_unique_hex() {
        let a = new_doc_id();
        let b = new_doc_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
